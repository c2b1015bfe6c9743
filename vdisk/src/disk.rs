//! # 分区管理层
//!
//! MBR 的四个槽位顺序放置；扩展分区内是一条 EBR 单链，
//! 链上 `start` 严格递增，区域彼此紧贴。

use std::fs;
use std::path::Path;

use rand::Rng;

use crate::image::ImageFile;
use crate::layout::{Ebr, Fit, Mbr, PartKind, Record, SlotStatus};
use crate::{now_f32, Error, Result};

/// fdisk 的 `-type` 取值；逻辑分区不占 MBR 槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionType {
    Primary,
    Extended,
    Logical,
}

/// mkdisk：建镜像并写入四槽皆空的 MBR
pub fn create_disk(path: &Path, size_bytes: u64, fit: Fit) -> Result<()> {
    let image = ImageFile::create(path, size_bytes)?;
    let signature = rand::thread_rng().gen_range(0..i32::MAX);
    let mbr = Mbr::new(size_bytes as i32, now_f32(), signature, fit);
    mbr.write_to(&image, 0)?;
    log::info!("disco creado: {} ({size_bytes} bytes)", path.display());
    Ok(())
}

/// rmdisk：删除镜像文件
pub fn remove_disk(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "el disco '{}' no existe",
            path.display()
        )));
    }
    fs::remove_file(path)?;
    Ok(())
}

/// fdisk：按类型建分区
pub fn create_partition(
    path: &Path,
    name: &str,
    size_bytes: i64,
    kind: PartitionType,
    fit: Fit,
) -> Result<()> {
    let image = ImageFile::open(path)?;
    let mbr = Mbr::read_from(&image, 0)?;

    // 名字在主/扩展槽位内必须唯一
    if mbr.find_by_name(name).is_some() {
        return Err(Error::AlreadyExists(format!(
            "el nombre '{name}' ya existe en el disco"
        )));
    }

    match kind {
        PartitionType::Primary => create_mbr_partition(&image, mbr, name, size_bytes, PartKind::Primary, fit),
        PartitionType::Extended => {
            if mbr.extended().is_some() {
                return Err(Error::AlreadyExists(
                    "ya existe una partición extendida en el disco".into(),
                ));
            }
            create_mbr_partition(&image, mbr, name, size_bytes, PartKind::Extended, fit)
        }
        PartitionType::Logical => create_logical_partition(&image, &mbr, name, size_bytes, fit),
    }
}

fn create_mbr_partition(
    image: &ImageFile,
    mut mbr: Mbr,
    name: &str,
    size_bytes: i64,
    kind: PartKind,
    fit: Fit,
) -> Result<()> {
    let Some((slot, start)) = mbr.first_free_slot() else {
        return Err(Error::NoSpace(
            "máximo de 4 particiones primarias/extendidas alcanzado".into(),
        ));
    };

    if size_bytes > (mbr.size - start) as i64 {
        return Err(Error::NoSpace(
            "no hay espacio suficiente en el disco".into(),
        ));
    }

    mbr.partitions[slot].create(start, size_bytes as i32, kind, fit, name);
    mbr.write_to(image, 0)?;
    log::debug!("partición '{name}' en slot {slot}, start={start}");
    Ok(())
}

/// 逻辑分区：沿 EBR 链走到末尾，新区域紧贴上一块
fn create_logical_partition(
    image: &ImageFile,
    mbr: &Mbr,
    name: &str,
    size_bytes: i64,
    fit: Fit,
) -> Result<()> {
    let Some(extended) = mbr.extended() else {
        return Err(Error::NotFound(
            "no hay partición extendida para crear lógicas".into(),
        ));
    };

    let first = Ebr::read_from(image, extended.start as u64)?;
    if !first.is_used() {
        // 链为空：首个 EBR 落在扩展分区起始处
        if size_bytes > extended.size as i64 {
            return Err(Error::NoSpace(
                "no hay espacio suficiente en la partición extendida".into(),
            ));
        }
        let ebr = Ebr::new(extended.start, size_bytes as i32, fit, name);
        return ebr.write_to(image, ebr.start as u64);
    }

    let mut remaining = extended.size as i64;
    let mut offset = extended.start as u64;
    let mut current = first;
    loop {
        if current.name() == name {
            return Err(Error::AlreadyExists(format!(
                "el nombre '{name}' ya existe en particiones lógicas"
            )));
        }
        remaining -= current.size as i64;
        if current.next == -1 {
            break;
        }
        offset = current.next as u64;
        current = Ebr::read_from(image, offset)?;
    }

    if size_bytes > remaining {
        return Err(Error::NoSpace(
            "no hay espacio suficiente en la partición extendida".into(),
        ));
    }

    let new_start = current.start + current.size;
    let ebr = Ebr::new(new_start, size_bytes as i32, fit, name);
    current.next = new_start;
    current.write_to(image, offset)?;
    ebr.write_to(image, new_start as u64)?;
    log::debug!("lógica '{name}' en start={new_start}");
    Ok(())
}

/// 遍历扩展分区的 EBR 链，对每个节点回调其镜像偏移与记录
pub fn walk_ebr_chain(
    image: &ImageFile,
    extended_start: i32,
    mut visit: impl FnMut(u64, &Ebr) -> bool,
) -> Result<()> {
    let mut offset = extended_start as u64;
    loop {
        let ebr = Ebr::read_from(image, offset)?;
        if !ebr.is_used() {
            return Ok(());
        }
        if visit(offset, &ebr) {
            return Ok(());
        }
        if ebr.next == -1 {
            return Ok(());
        }
        offset = ebr.next as u64;
    }
}

/// 收集整条链（报表用）
pub fn collect_ebrs(image: &ImageFile, mbr: &Mbr) -> Result<Vec<Ebr>> {
    let mut out = Vec::new();
    if let Some(extended) = mbr.extended() {
        walk_ebr_chain(image, extended.start, |_, ebr| {
            out.push(ebr.clone());
            false
        })?;
    }
    Ok(out)
}

/// 镜像里已挂载的逻辑分区个数（序号铸造用）
pub fn mounted_logicals(image: &ImageFile, mbr: &Mbr) -> Result<i32> {
    let mut count = 0;
    if let Some(extended) = mbr.extended() {
        walk_ebr_chain(image, extended.start, |_, ebr| {
            if ebr.status == SlotStatus::Mounted {
                count += 1;
            }
            false
        })?;
    }
    Ok(count)
}
