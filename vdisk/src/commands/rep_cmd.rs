//! 报表命令：生成 DOT 文本并写到目标路径。
//! 渲染 PNG（调用 `dot`）属于外部协作方，这里只产出文本。

use std::fs as host_fs;
use std::path::Path;

use super::{Dispatcher, ReportKind};
use crate::disk::collect_ebrs;
use crate::fs::ExtFileSystem;
use crate::image::ImageFile;
use crate::layout::{Mbr, Record};
use crate::{reports, Error, Result};

pub(super) fn rep(
    d: &Dispatcher,
    id: &str,
    name: ReportKind,
    path: &Path,
    _path_file_ls: Option<&str>,
) -> Result<String> {
    let mp = d.mounts.locate(id)?;
    let image = ImageFile::open(&mp.path)?;
    let mbr = Mbr::read_from(&image, 0)?;

    let dot = match name {
        ReportKind::Mbr => reports::mbr(&mbr, &collect_ebrs(&image, &mbr)?),
        ReportKind::Ebr => {
            let ebrs = collect_ebrs(&image, &mbr)?;
            if ebrs.is_empty() {
                return Err(Error::NotFound(
                    "el disco no tiene particiones lógicas".into(),
                ));
            }
            reports::ebr(&ebrs)
        }
        ReportKind::Disk => reports::disk(&mbr, &collect_ebrs(&image, &mbr)?),
        ReportKind::Sb => {
            let fs = ExtFileSystem::open(image, mp.fs_start)?;
            reports::super_block(&fs.sb)
        }
        ReportKind::Inode => {
            let fs = ExtFileSystem::open(image, mp.fs_start)?;
            reports::inodes(&fs)?
        }
        ReportKind::Block => {
            let fs = ExtFileSystem::open(image, mp.fs_start)?;
            reports::blocks(&fs)?
        }
        ReportKind::BmInode => {
            let fs = ExtFileSystem::open(image, mp.fs_start)?;
            reports::bitmap(&fs.inode_bitmap(), fs.image(), "Bitmap Inodos")?
        }
        ReportKind::BmBlock => {
            let fs = ExtFileSystem::open(image, mp.fs_start)?;
            reports::bitmap(&fs.block_bitmap(), fs.image(), "Bitmap Bloques")?
        }
        ReportKind::Tree => {
            let fs = ExtFileSystem::open(image, mp.fs_start)?;
            reports::tree(&fs)?
        }
        ReportKind::File | ReportKind::Ls => {
            return Err(Error::Unsupported("reporte no implementado"));
        }
    };

    if let Some(parent) = path.parent() {
        host_fs::create_dir_all(parent)?;
    }
    host_fs::write(path, dot)?;
    Ok(format!(
        "REP: Reporte {} generado en {}",
        name.label(),
        path.display()
    ))
}
