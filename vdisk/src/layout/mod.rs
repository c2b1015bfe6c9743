//! # 磁盘数据结构层
//!
//! 镜像布局：
//! MBR | 分区…；分区内：超级块 | inode位图 | 块位图 | inode表 | 块表
//!
//! 所有记录紧凑小端，尺寸必须与既有镜像语料逐字节一致。

mod mbr;
pub use mbr::{Fit, Mbr, PartKind, Partition, SlotStatus};

mod ebr;
pub use ebr::Ebr;

mod super_block;
pub use super_block::{Geometry, SuperBlock};

mod inode;
pub use inode::{Inode, InodeKind, DIRECT_BLOCKS};

mod block;
pub use block::{FileBlock, FolderBlock, FolderEntry};

mod bitmap;
pub use bitmap::Bitmap;

use crate::image::ImageFile;
use crate::Result;

/// 镜像内的定长记录：定点读写 + 手写编解码
pub trait Record: Sized {
    const SIZE: usize;

    fn encode(&self, buf: &mut [u8]);
    fn decode(buf: &[u8]) -> Self;

    fn write_to(&self, image: &ImageFile, offset: u64) -> Result<()> {
        let mut buf = vec![0u8; Self::SIZE];
        self.encode(&mut buf);
        image.write_at(offset, &buf)
    }

    fn read_from(image: &ImageFile, offset: u64) -> Result<Self> {
        let mut buf = vec![0u8; Self::SIZE];
        image.read_at(offset, &mut buf)?;
        Ok(Self::decode(&buf))
    }
}

/// 名字段：NUL 填充的定宽字节串
pub(crate) fn pack_name<const N: usize>(name: &str) -> [u8; N] {
    let mut out = [0u8; N];
    let bytes = name.as_bytes();
    let len = bytes.len().min(N);
    out[..len].copy_from_slice(&bytes[..len]);
    out
}

/// 去掉 NUL 尾巴后按 UTF-8 解读
pub(crate) fn unpack_name(raw: &[u8]) -> String {
    let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..len]).into_owned()
}
