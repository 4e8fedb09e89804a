pub mod addressing;
pub mod advice;
pub mod desk;
pub mod domain;
pub mod error;
pub mod identity;
pub mod memory;
pub mod pairing;
pub mod paths;
pub mod ports;
pub mod push_id;
pub mod render;
pub mod session;
pub mod thread;

pub use addressing::{address_of, AddressError};
pub use advice::{AdviceAnnotator, AdviceOutcome};
pub use desk::{StudentDesk, StudentThread, StudentView, TeacherDesk, TeacherView};
pub use domain::{ConversationId, DiaryForm, Entry, EntryId, Identity, Role, StoredEntry, User};
pub use error::{DeskError, DeskResult};
pub use ports::{ClientContext, IdentityProvider, PortError, PortResult, TreeStore};
pub use render::{render, RenderedThread};
pub use session::{Authenticated, GateDecision, SessionGate};
