//! 会话与用户命令的执行

use super::Dispatcher;
use crate::fs::{ExtFileSystem, USERS_INODE};
use crate::image::ImageFile;
use crate::users::UserCatalog;
use crate::{Error, Result};

pub(super) fn login(d: &mut Dispatcher, user: &str, pass: &str, id: &str) -> Result<String> {
    if d.session.is_active() {
        return Err(Error::StateViolation(
            "ya hay una sesión activa, cierre la sesión actual primero".into(),
        ));
    }

    let mp = d.mounts.locate(id)?;
    let image = ImageFile::open(&mp.path)?;
    let fs = ExtFileSystem::open(image, mp.fs_start)?;

    let text = fs.read_file(USERS_INODE)?;
    let catalog = UserCatalog::parse(&String::from_utf8_lossy(&text))?;

    let Some(uid) = catalog.authenticate(user, pass) else {
        return Err(Error::BadCredentials);
    };

    // GID 以 UID 代用（目录里没有独立的组编号映射）
    d.session.start(id, user, uid, uid);
    log::info!("sesión iniciada: {user} (uid={uid}) en {id}");
    Ok(format!("LOGIN: Sesión iniciada como {user} en {id}"))
}

pub(super) fn logout(d: &mut Dispatcher) -> Result<String> {
    if !d.session.is_active() {
        return Err(Error::StateViolation(
            "no hay ninguna sesión activa para cerrar".into(),
        ));
    }
    d.session.clear();
    Ok("LOGOUT: Sesión cerrada correctamente".into())
}

/// 只有 root 能删用户；删除 = 把该行 UID 改写成 0 后原地重写 users.txt
pub(super) fn rmusr(d: &Dispatcher, user: &str) -> Result<String> {
    d.session.require_active()?;
    if !d.session.is_root() {
        return Err(Error::StateViolation(
            "solo el usuario root puede eliminar usuarios".into(),
        ));
    }

    let mut fs = d.session_fs()?;
    let text = fs.read_file(USERS_INODE)?;
    let mut catalog = UserCatalog::parse(&String::from_utf8_lossy(&text))?;
    catalog.remove_user(user)?;

    fs.rewrite_file(USERS_INODE, catalog.render().as_bytes())?;
    fs.flush_sb()?;
    Ok(format!("RMUSR: Usuario {user} eliminado exitosamente"))
}
