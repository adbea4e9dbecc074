pub mod radical_graph;
