use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// 所有命令共用的错误分类。
/// `Display` 输出以分类名为前缀，REPL 直接打印。
#[derive(Debug)]
pub enum Error {
    /// 旗标缺失、格式错误或取值域不合法
    ArgParse(String),
    /// 磁盘、分区或目录无法再增长
    NoSpace(String),
    NotFound(String),
    AlreadyExists(String),
    /// 状态机冲突：已挂载、已格式化、无会话、非root等
    StateViolation(String),
    /// mkfile 无 `-r` 时父目录缺失
    ParentMissing(String),
    NotADirectory(String),
    IsADirectory(String),
    BadCredentials,
    Unsupported(&'static str),
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ArgParse(m) => write!(f, "ArgParse: {m}"),
            Error::NoSpace(m) => write!(f, "NoSpace: {m}"),
            Error::NotFound(m) => write!(f, "NotFound: {m}"),
            Error::AlreadyExists(m) => write!(f, "AlreadyExists: {m}"),
            Error::StateViolation(m) => write!(f, "StateViolation: {m}"),
            Error::ParentMissing(m) => write!(f, "ParentMissing: {m}"),
            Error::NotADirectory(m) => write!(f, "NotADirectory: {m}"),
            Error::IsADirectory(m) => write!(f, "IsADirectory: {m}"),
            Error::BadCredentials => write!(f, "BadCredentials: usuario o contraseña incorrectos"),
            Error::Unsupported(m) => write!(f, "Unsupported: {m}"),
            Error::Io(e) => write!(f, "IoError: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
