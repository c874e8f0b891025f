// Comments - a commenting capability any owner entity can adopt
//
// Owner types implement `Commentable` and register once at startup through
// `CommentableRegistryBuilder`. Comments point at their owner through an
// (owner_type, owner_key) pair resolved on demand via the registry.

pub mod capability;
pub mod forms;
pub mod handlers;
pub mod identifier;
pub mod lifecycle;
pub mod model;
pub mod privacy;
pub mod registry;
pub mod store;
pub mod views;

pub use capability::{CommentCapability, Commentable, SubmissionRoute};
pub use identifier::{KeyScheme, OwnerKey};
pub use lifecycle::CommentService;
pub use model::{Comment, OwnerRef, ResolvedOwner};
pub use registry::{CommentableRegistry, CommentableRegistryBuilder};
