//! Graphviz Export

use crate::graph::Graph;
use std::fmt::Write;

impl Graph {
    /// Render the topology as a Graphviz DOT digraph
    ///
    /// Nodes are emitted in topological order; edges point from a dependency
    /// to the node consuming it.
    pub fn to_dot(&self) -> String {
        let mut output = String::from("digraph {\n");

        for &index in &self.order {
            let _ = writeln!(
                output,
                "    n{} [label=\"{}\"];",
                index,
                escape_label(&self.nodes[index].label)
            );
        }

        for &index in &self.order {
            for &dep in &self.nodes[index].dependencies {
                let _ = writeln!(output, "    n{} -> n{};", dep, index);
            }
        }

        output.push_str("}\n");
        output
    }
}

fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use crate::graph::GraphBuilder;
    use std::convert::Infallible;

    #[test]
    fn test_dot_lists_nodes_and_edges() {
        let mut builder = GraphBuilder::new();
        let a = builder.root("alpha", || Ok::<_, Infallible>(1_i32));
        let b = builder.root("beta", || Ok::<_, Infallible>(2_i32));
        builder.node("sum", (a, b), |(a, b)| Ok::<_, Infallible>(*a + *b));
        let dot = builder.build().unwrap().to_dot();

        assert!(dot.starts_with("digraph {\n"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("n0 [label=\"alpha\"];"));
        assert!(dot.contains("n2 [label=\"sum\"];"));
        assert!(dot.contains("n0 -> n2;"));
        assert!(dot.contains("n1 -> n2;"));
        assert_eq!(dot.matches("->").count(), 2);
    }

    #[test]
    fn test_dot_escapes_quotes() {
        let mut builder = GraphBuilder::new();
        builder.root("say \"hi\"", || Ok::<_, Infallible>(()));
        let dot = builder.build().unwrap().to_dot();

        assert!(dot.contains("[label=\"say \\\"hi\\\"\"]"));
    }
}
