#![deny(warnings)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod builder;
pub mod classifier;
pub mod enrich;
pub mod tree;

pub use builder::{build, Cell, Chart, ChartStats, Split};
pub use classifier::{HttpClassifier, Prediction, SplitClassifier, SplitPair, StubClassifier, TableClassifier};
pub use enrich::{enrich, EnrichStats};
pub use tree::{
    canonical_tree, enumerate_trees, expand_by_tree_id, expand_from_cell, CellExpansion, Color,
    Enumeration, SplitExpansion, TreeExpansion, TreeNode, DEFAULT_MAX_TREES, DEFAULT_PRED_THRESHOLD,
};
