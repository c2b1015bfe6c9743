//! 磁盘与分区命令的执行

use std::path::Path;

use super::{Dispatcher, Unit};
use crate::disk::{self, PartitionType};
use crate::layout::Fit;
use crate::Result;

pub(super) fn mkdisk(size: u32, unit: Unit, fit: Fit, path: &Path) -> Result<String> {
    disk::create_disk(path, unit.to_bytes(size), fit)?;
    Ok(format!(
        "MKDISK: Disco creado exitosamente en {}",
        path.display()
    ))
}

pub(super) fn rmdisk(path: &Path) -> Result<String> {
    disk::remove_disk(path)?;
    Ok(format!(
        "RMDISK: Disco eliminado exitosamente en {}",
        path.display()
    ))
}

pub(super) fn fdisk(
    size: u32,
    unit: Unit,
    fit: Fit,
    kind: PartitionType,
    name: &str,
    path: &Path,
) -> Result<String> {
    disk::create_partition(path, name, unit.to_bytes(size) as i64, kind, fit)?;
    Ok(format!(
        "FDISK: Partición {name} creada correctamente en {}",
        path.display()
    ))
}

pub(super) fn mount(d: &mut Dispatcher, path: &Path, name: &str) -> Result<String> {
    let id = d.mounts.mount(path, name)?;
    Ok(format!(
        "MOUNT: Partición {name} montada correctamente con ID: {id}"
    ))
}

pub(super) fn mounted(d: &Dispatcher) -> Result<String> {
    if d.mounts.is_empty() {
        return Ok("MOUNTED: No hay particiones montadas".into());
    }
    Ok(format!("MOUNTED: {}", d.mounts.ids().join(", ")))
}
