use crate::{Error, Result};

/// 进程级会话：LoggedOut ⇄ LoggedIn。
/// 登出状态下所有字段为空。
#[derive(Debug, Default, Clone)]
pub struct Session {
    pub id: String,
    pub username: String,
    pub uid: i32,
    pub gid: i32,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        !self.id.is_empty()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.username == "root"
    }

    /// 需要已登录的命令在入口处调用
    pub fn require_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(Error::StateViolation(
                "no hay sesión activa, inicie sesión primero".into(),
            ))
        }
    }

    pub fn start(&mut self, id: &str, username: &str, uid: i32, gid: i32) {
        self.id = id.to_string();
        self.username = username.to_string();
        self.uid = uid;
        self.gid = gid;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
