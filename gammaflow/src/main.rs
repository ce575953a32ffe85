fn main() -> anyhow::Result<()> {
    gammaflow::run()
}
