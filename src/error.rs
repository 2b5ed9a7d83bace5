use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("unable to open netlink socket: {0}")]
    Connection(String),
    #[error("unable to query routes: {0}")]
    RouteQuery(String),
    #[error("found default route but could not determine interface")]
    UnresolvedDefaultRoute,
    #[error("unable to find default route")]
    NoDefaultRoute,
    #[error("unable to enumerate interfaces: {0}")]
    InterfaceEnumeration(String),
    #[error("unable to enumerate addresses of interface {interface}: {message}")]
    AddressEnumeration { interface: String, message: String },
    #[error("unable to persist environment: {0}")]
    Persist(String),
}

impl Error {
    /// Exit status reported by the command line front end.
    pub fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            Error::Connection(_) => exitcode::OSERR,
            Error::Persist(_) => exitcode::CANTCREAT,
            _ => exitcode::UNAVAILABLE,
        }
    }
}
