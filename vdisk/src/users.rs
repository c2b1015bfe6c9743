//! # 用户目录
//!
//! `/users.txt` 逐行记账：
//! - 组：`GID,G,<nombre>`
//! - 用户：`UID,U,<grupo>,<nombre>,<contraseña>`
//!
//! UID 为 0 表示用户已删除；删除就是把该行的 UID 改写成 0。

use crate::{Error, Result};

/// mkfs 写入的引导内容
pub const BOOTSTRAP: &str = "1,G,root\n1,U,root,root,123\n";

#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Group {
        gid: i32,
        name: String,
    },
    User {
        uid: i32,
        group: String,
        name: String,
        password: String,
    },
}

#[derive(Debug, Default)]
pub struct UserCatalog {
    lines: Vec<Line>,
}

impl UserCatalog {
    /// 解析 users.txt 的文本；空行忽略，畸形行视为损坏
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = Vec::new();
        for raw in text.lines() {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let fields: Vec<&str> = raw.split(',').collect();
            let parsed = match fields.as_slice() {
                [gid, "G", name] => Line::Group {
                    gid: parse_id(gid)?,
                    name: name.to_string(),
                },
                [uid, "U", group, name, password] => Line::User {
                    uid: parse_id(uid)?,
                    group: group.to_string(),
                    name: name.to_string(),
                    password: password.to_string(),
                },
                _ => {
                    return Err(Error::Io(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("línea inválida en users.txt: '{raw}'"),
                    )))
                }
            };
            lines.push(parsed);
        }
        Ok(Self { lines })
    }

    /// 重新渲染为文本，尾随换行
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Group { gid, name } => {
                    out.push_str(&format!("{gid},G,{name}\n"));
                }
                Line::User {
                    uid,
                    group,
                    name,
                    password,
                } => {
                    out.push_str(&format!("{uid},U,{group},{name},{password}\n"));
                }
            }
        }
        out
    }

    /// 按用户名+口令找存活用户，命中返回 UID
    pub fn authenticate(&self, user: &str, pass: &str) -> Option<i32> {
        self.lines.iter().find_map(|line| match line {
            Line::User {
                uid,
                name,
                password,
                ..
            } if *uid != 0 && name == user && password == pass => Some(*uid),
            _ => None,
        })
    }

    /// 把用户行的 UID 改写成 0
    pub fn remove_user(&mut self, user: &str) -> Result<()> {
        for line in &mut self.lines {
            if let Line::User { uid, name, .. } = line {
                if name == user && *uid != 0 {
                    *uid = 0;
                    return Ok(());
                }
            }
        }
        Err(Error::NotFound(format!(
            "el usuario '{user}' no existe o ya está eliminado"
        )))
    }
}

fn parse_id(raw: &str) -> Result<i32> {
    raw.parse().map_err(|_| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("identificador inválido en users.txt: '{raw}'"),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_round_trip() {
        let catalog = UserCatalog::parse(BOOTSTRAP).unwrap();
        assert_eq!(catalog.render(), BOOTSTRAP);
    }

    #[test]
    fn authenticate_root() {
        let catalog = UserCatalog::parse(BOOTSTRAP).unwrap();
        assert_eq!(catalog.authenticate("root", "123"), Some(1));
        assert_eq!(catalog.authenticate("root", "mal"), None);
    }

    #[test]
    fn remove_rewrites_uid() {
        let mut catalog = UserCatalog::parse(BOOTSTRAP).unwrap();
        catalog.remove_user("root").unwrap();
        assert_eq!(catalog.render(), "1,G,root\n0,U,root,root,123\n");
        // 已删除的用户既不认证也不能再删
        assert_eq!(catalog.authenticate("root", "123"), None);
        assert!(catalog.remove_user("root").is_err());
    }
}
