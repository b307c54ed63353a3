pub mod backend;
pub mod deps;
pub mod fingerprint;
pub mod orchestrator;
pub mod poller;

pub use backend::HttpAnalysisBackend;
pub use deps::{AnalysisBackend, CoreDeps, RequestLedger, ResultCache};
pub use fingerprint::Fingerprint;
pub use orchestrator::{AnalysisOutcome, Orchestrator};
pub use poller::{PollBudget, PollOutcome, Poller};
