use crate::codec::{Reader, Writer};
use crate::layout::{FileBlock, Inode, Record};
use crate::MAGIC;

/// 分区内各区域的字节偏移，由 `n` 一次算定
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    /// inode 总配额；块配额恒为 3n
    pub n: i32,
    pub bm_inode_start: i32,
    pub bm_block_start: i32,
    pub inode_start: i32,
    pub block_start: i32,
}

impl Geometry {
    /// `n = (S − sizeof(SuperBlock)) / (4 + sizeof(Inode) + 3·sizeof(FileBlock))`
    pub fn compute(partition_start: i32, partition_size: i32) -> Self {
        let numerator = partition_size - SuperBlock::SIZE as i32;
        let denominator = (4 + Inode::SIZE + 3 * FileBlock::SIZE) as i32;
        let n = numerator / denominator;

        let bm_inode_start = partition_start + SuperBlock::SIZE as i32;
        let bm_block_start = bm_inode_start + n;
        let inode_start = bm_block_start + 3 * n;
        let block_start = inode_start + n * Inode::SIZE as i32;

        Self {
            n,
            bm_inode_start,
            bm_block_start,
            inode_start,
            block_start,
        }
    }
}

/// 超级块：
/// - 魔数校验分区是否已格式化；
/// - 定位位图、inode 表与块表；
/// - 维护分配计数器
#[derive(Debug, Clone, PartialEq)]
pub struct SuperBlock {
    /// 2 或 3；3fs 仅记录在案，行为同 2fs
    pub fs_type: i32,
    /// 已分配 inode 数（高水位）
    pub inodes_count: i32,
    pub blocks_count: i32,
    pub free_inodes_count: i32,
    pub free_blocks_count: i32,
    pub mtime: f32,
    pub umtime: f32,
    pub mnt_count: i32,
    pub magic: i32,
    pub inode_size: i32,
    pub block_size: i32,
    /// 下一空闲 inode 记录的字节偏移（咨询性指针）
    pub first_ino: i32,
    pub first_blo: i32,
    pub bm_inode_start: i32,
    pub bm_block_start: i32,
    pub inode_start: i32,
    pub block_start: i32,
}

impl SuperBlock {
    pub fn new(geo: &Geometry, fs_type: i32, now: f32) -> Self {
        Self {
            fs_type,
            inodes_count: 0,
            blocks_count: 0,
            free_inodes_count: geo.n,
            free_blocks_count: 3 * geo.n,
            mtime: now,
            umtime: now,
            mnt_count: 1,
            magic: MAGIC,
            inode_size: Inode::SIZE as i32,
            block_size: FileBlock::SIZE as i32,
            first_ino: geo.inode_start,
            first_blo: geo.block_start,
            bm_inode_start: geo.bm_inode_start,
            bm_block_start: geo.bm_block_start,
            inode_start: geo.inode_start,
            block_start: geo.block_start,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.magic == MAGIC
    }

    /// inode 配额 n（位图每 inode 一字节）
    #[inline]
    pub fn inode_quota(&self) -> i32 {
        self.bm_block_start - self.bm_inode_start
    }

    #[inline]
    pub fn block_quota(&self) -> i32 {
        3 * self.inode_quota()
    }

    #[inline]
    pub fn inode_offset(&self, index: i32) -> u64 {
        (self.inode_start + index * self.inode_size) as u64
    }

    #[inline]
    pub fn block_offset(&self, index: i32) -> u64 {
        (self.block_start + index * self.block_size) as u64
    }
}

impl Record for SuperBlock {
    const SIZE: usize = 17 * 4;

    fn encode(&self, buf: &mut [u8]) {
        let mut w = Writer::new(buf);
        w.i32(self.fs_type);
        w.i32(self.inodes_count);
        w.i32(self.blocks_count);
        w.i32(self.free_inodes_count);
        w.i32(self.free_blocks_count);
        w.f32(self.mtime);
        w.f32(self.umtime);
        w.i32(self.mnt_count);
        w.i32(self.magic);
        w.i32(self.inode_size);
        w.i32(self.block_size);
        w.i32(self.first_ino);
        w.i32(self.first_blo);
        w.i32(self.bm_inode_start);
        w.i32(self.bm_block_start);
        w.i32(self.inode_start);
        w.i32(self.block_start);
    }

    fn decode(buf: &[u8]) -> Self {
        let mut r = Reader::new(buf);
        Self {
            fs_type: r.i32(),
            inodes_count: r.i32(),
            blocks_count: r.i32(),
            free_inodes_count: r.i32(),
            free_blocks_count: r.i32(),
            mtime: r.f32(),
            umtime: r.f32(),
            mnt_count: r.i32(),
            magic: r.i32(),
            inode_size: r.i32(),
            block_size: r.i32(),
            first_ino: r.i32(),
            first_blo: r.i32(),
            bm_inode_start: r.i32(),
            bm_block_start: r.i32(),
            inode_start: r.i32(),
            block_start: r.i32(),
        }
    }
}
