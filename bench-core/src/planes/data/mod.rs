pub mod hello_service;
pub mod operation;

pub use hello_service::HelloService;
pub use operation::HelloOperations;
