pub mod batch;
pub mod collection;
pub mod error;
pub mod eventual;
pub mod id;
pub mod operation;
pub mod path;
pub mod proxy;
pub mod reader;
pub mod record;
pub mod registry;
pub mod request;
pub mod resultset;
pub mod store;
pub mod writer;

pub use batch::Batch;
pub use collection::Collection;
pub use eventual::{Eventual, EventualState, Progress, Settled};
pub use id::{BatchId, CollectionId, OperationId, RequestId};
pub use operation::Operation;
pub use path::PropertyPath;
pub use proxy::{Proxy, ProxyConfig};
pub use reader::Reader;
pub use record::Record;
pub use registry::ProxyRegistry;
pub use request::{Action, Request, RequestParams, Window};
pub use resultset::ResultSet;
pub use store::{Store, StoreConfig};
pub use writer::{JsonWriter, WriteBody, Writer};
