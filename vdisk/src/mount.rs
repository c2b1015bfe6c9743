//! # 挂载表
//!
//! 进程级的 ID→镜像路径 映射，由命令分发器持有并按引用传递；
//! 进程退出即消失，不落盘。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::disk::{mounted_logicals, walk_ebr_chain};
use crate::image::ImageFile;
use crate::layout::{Ebr, Mbr, PartKind, Record, SlotStatus};
use crate::{Error, Result, CARNET};

/// 挂载ID定位出的分区：文件系统区的偏移与大小。
/// 逻辑分区的可用区从其 EBR 之后开始。
#[derive(Debug, Clone)]
pub struct MountPoint {
    pub id: String,
    pub path: PathBuf,
    pub fs_start: i32,
    pub fs_size: i32,
    pub is_logical: bool,
}

#[derive(Debug, Default)]
pub struct MountTable {
    entries: BTreeMap<String, PathBuf>,
}

impl MountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// mount：按名字在 MBR 槽位与 EBR 链里找分区，铸造 ID 并登记
    pub fn mount(&mut self, path: &Path, name: &str) -> Result<String> {
        let image = ImageFile::open(path)?;
        let mut mbr = Mbr::read_from(&image, 0)?;

        if let Some(slot) = mbr.find_by_name(name) {
            let partition = &mbr.partitions[slot];
            if partition.kind == PartKind::Extended {
                return Err(Error::StateViolation(
                    "no se pueden montar particiones extendidas".into(),
                ));
            }
            if partition.status == SlotStatus::Mounted {
                return Err(Error::StateViolation("la partición ya está montada".into()));
            }

            let correlative = next_correlative(&image, &mbr)?;
            let id = mint_id(correlative);
            self.check_free(&id)?;

            mbr.partitions[slot].mount(correlative, &id);
            mbr.write_to(&image, 0)?;
            self.entries.insert(id.clone(), path.to_path_buf());
            log::info!("'{name}' montada como {id}");
            return Ok(id);
        }

        // 不在 MBR 里，沿 EBR 链找逻辑分区
        let Some(extended) = mbr.extended() else {
            return Err(Error::NotFound(format!(
                "la partición '{name}' no existe en el disco"
            )));
        };

        let mut hit: Option<(u64, Ebr)> = None;
        walk_ebr_chain(&image, extended.start, |offset, ebr| {
            if ebr.name() == name {
                hit = Some((offset, ebr.clone()));
                true
            } else {
                false
            }
        })?;

        let Some((offset, mut ebr)) = hit else {
            return Err(Error::NotFound(format!(
                "la partición '{name}' no existe en el disco"
            )));
        };
        if ebr.status == SlotStatus::Mounted {
            return Err(Error::StateViolation(
                "la partición lógica ya está montada".into(),
            ));
        }

        let correlative = next_correlative(&image, &mbr)?;
        let id = mint_id(correlative);
        self.check_free(&id)?;

        ebr.mount(&id);
        ebr.write_to(&image, offset)?;
        self.entries.insert(id.clone(), path.to_path_buf());
        log::info!("lógica '{name}' montada como {id}");
        Ok(id)
    }

    /// 已挂载的 ID，按字典序
    pub fn ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 由 ID 定位分区的文件系统区
    pub fn locate(&self, id: &str) -> Result<MountPoint> {
        let Some(path) = self.entries.get(id) else {
            return Err(Error::NotFound(format!("la partición {id} no está montada")));
        };

        let image = ImageFile::open(path)?;
        let mbr = Mbr::read_from(&image, 0)?;

        if let Some(partition) = mbr.find_by_id(id) {
            return Ok(MountPoint {
                id: id.to_string(),
                path: path.clone(),
                fs_start: partition.start,
                fs_size: partition.size,
                is_logical: false,
            });
        }

        let Some(extended) = mbr.extended() else {
            return Err(Error::NotFound(format!(
                "la partición {id} no aparece en el disco"
            )));
        };

        let mut hit: Option<Ebr> = None;
        walk_ebr_chain(&image, extended.start, |_, ebr| {
            if ebr.id() == id {
                hit = Some(ebr.clone());
                true
            } else {
                false
            }
        })?;

        match hit {
            Some(ebr) => Ok(MountPoint {
                id: id.to_string(),
                path: path.clone(),
                fs_start: ebr.payload_start(),
                fs_size: ebr.payload_size(),
                is_logical: true,
            }),
            None => Err(Error::NotFound(format!(
                "la partición {id} no aparece en el disco"
            ))),
        }
    }

    fn check_free(&self, id: &str) -> Result<()> {
        // 序号逻辑下不应碰撞，仍然校验
        if self.entries.contains_key(id) {
            return Err(Error::AlreadyExists(format!("el ID {id} ya está en uso")));
        }
        Ok(())
    }
}

/// 本镜像的下一个挂载序号：
/// 已挂载 MBR 槽位的最大序号 + 已挂载逻辑分区数 + 1
fn next_correlative(image: &ImageFile, mbr: &Mbr) -> Result<i32> {
    Ok(mbr.max_mounted_correlative() + mounted_logicals(image, mbr)? + 1)
}

/// ID = 学号尾数 ++ 序号 ++ 'A'
fn mint_id(correlative: i32) -> String {
    format!("{CARNET}{correlative}A")
}
