//! # 镜像文件层
//!
//! 每条命令各自打开镜像、读写、关闭；进程内不持久持有句柄。

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::Result;

/// 宿主机上的平面磁盘镜像
pub struct ImageFile(Mutex<File>);

/// mkdisk 清零用的写入块
const ZERO_CHUNK: usize = 1024 * 1024;

impl ImageFile {
    /// 创建镜像：补全父目录，按 1 MiB 块写满零字节
    pub fn create(path: &Path, size: u64) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let zeros = vec![0u8; ZERO_CHUNK];
        let mut remaining = size as usize;
        while remaining > 0 {
            let n = remaining.min(ZERO_CHUNK);
            file.write_all(&zeros[..n])?;
            remaining -= n;
        }
        file.flush()?;

        log::debug!("imagen creada: {} ({size} bytes)", path.display());
        Ok(Self(Mutex::new(file)))
    }

    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self(Mutex::new(file)))
    }

    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let mut file = self.0.lock().unwrap();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;
        Ok(())
    }

    pub fn write_at(&self, offset: u64, buf: &[u8]) -> Result<()> {
        let mut file = self.0.lock().unwrap();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)?;
        Ok(())
    }

    pub fn len(&self) -> Result<u64> {
        let file = self.0.lock().unwrap();
        Ok(file.metadata()?.len())
    }
}
