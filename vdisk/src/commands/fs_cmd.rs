//! 文件系统命令的执行

use super::{Dispatcher, FsKind};
use crate::fs::{components, ExtFileSystem};
use crate::image::ImageFile;
use crate::{Error, Result};

pub(super) fn mkfs(d: &Dispatcher, id: &str, fs: FsKind) -> Result<String> {
    let mp = d.mounts.locate(id)?;
    let image = ImageFile::open(&mp.path)?;
    ExtFileSystem::format(image, mp.fs_start, mp.fs_size, fs.fs_type())?;
    Ok(format!(
        "MKFS: Partición {id} formateada con éxito con sistema {}",
        fs.label()
    ))
}

pub(super) fn mkdir(d: &Dispatcher, path: &str, parents: bool) -> Result<String> {
    d.session.require_active()?;
    let (uid, gid) = (d.session.uid, d.session.gid);

    let comps = components(path);
    let Some((&leaf, dirs)) = comps.split_last() else {
        return Err(Error::ArgParse("la ruta no puede ser la raíz".into()));
    };

    let mut fs = d.session_fs()?;
    let parent = fs.resolve_dir(dirs, parents, uid, gid)?;
    fs.create_dir(parent, leaf, uid, gid)?;
    fs.flush_sb()?;
    Ok(format!("MKDIR: Directorio {path} creado correctamente"))
}

pub(super) fn mkfile(
    d: &Dispatcher,
    path: &str,
    parents: bool,
    size: u32,
    cont: Option<&str>,
) -> Result<String> {
    d.session.require_active()?;
    let (uid, gid) = (d.session.uid, d.session.gid);

    let comps = components(path);
    let Some((&leaf, dirs)) = comps.split_last() else {
        return Err(Error::ArgParse("la ruta no puede ser la raíz".into()));
    };

    // 内容优先取 -cont；否则 -size 个 '0'；再否则空
    let content: Vec<u8> = match cont {
        Some(c) if !c.is_empty() => c.as_bytes().to_vec(),
        _ => vec![b'0'; size as usize],
    };

    let mut fs = d.session_fs()?;
    let parent = fs.resolve_dir(dirs, parents, uid, gid)?;
    fs.create_file(parent, leaf, uid, gid, &content)?;
    fs.flush_sb()?;
    Ok(format!("MKFILE: Archivo {path} creado correctamente"))
}

/// 逐个解析路径并拼接内容；多文件之间以换行分隔
pub(super) fn cat(d: &Dispatcher, files: &[String]) -> Result<String> {
    d.session.require_active()?;
    let fs = d.session_fs()?;

    let mut pieces = Vec::with_capacity(files.len());
    for path in files {
        let ino = fs.resolve(path)?;
        let bytes = fs.read_file(ino)?;
        pieces.push(String::from_utf8_lossy(&bytes).into_owned());
    }
    Ok(pieces.join("\n"))
}
