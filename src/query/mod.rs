// Submodules for separation of concerns
mod eval;
mod exec;
mod parse;
mod pipeline;
mod types;

pub use eval::{compare_bson, compare_docs, eval_filter};
pub use exec::{apply_update, count_docs, delete_many, find_docs, update_many};
pub use parse::{parse_query, parse_update};
pub use pipeline::{Accumulator, GroupSpec, Stage, run_pipeline};
pub use types::{
    CmpOp, DeleteReport, Filter, FindOptions, Order, SortSpec, UpdateDoc, UpdateReport,
};
