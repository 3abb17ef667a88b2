//! Descriptor contract for the runblocks catalog.
//!
//! A block is a declarative wrapper around exactly one AWS SDK API call: a
//! name, a description, a JSON schema for its input configuration (mirroring
//! the AWS request shape), a JSON schema for the event it emits (mirroring
//! the AWS response shape), and an async execution hook. The hosting workflow
//! engine supplies an [`AwsConnection`] and a JSON config, and receives the
//! raw service response re-emitted as JSON.
//!
//! Retry, signing, pagination, and the wire protocol are the AWS SDK's job,
//! not this crate's.

pub mod block;
pub mod connection;
pub mod convert;
pub mod error;
pub mod registry;

pub use block::{parse_config, to_output, Block};
pub use connection::AwsConnection;
pub use error::{BlockError, BlockResult};
pub use registry::Registry;
