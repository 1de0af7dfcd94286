pub mod document;
pub mod loaders;
pub mod result;
pub mod task;

pub use document::Document;
pub use loaders::{load_task_set, AutoLoader, DocumentLoader, PdfLoader, TextLoader};
pub use result::{
    FailureKind, KeepLast, MergePolicy, ResultMapping, RunReport, RunStatus, TaskFailure,
    TaskOutcome,
};
pub use task::{Task, TaskSet};
