use crate::codec::{Reader, Writer};
use crate::layout::Record;

/// 直接块数；其后三格留给未实现的间接索引
pub const DIRECT_BLOCKS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InodeKind {
    Folder = b'0',
    File = b'1',
}

impl InodeKind {
    fn from_byte(b: u8) -> Self {
        match b {
            b'1' => Self::File,
            _ => Self::Folder,
        }
    }
}

/// 文件系统项的元信息。
/// `block` 前 12 格是直接块索引，后 3 格保留，未用格为 -1。
#[derive(Debug, Clone, PartialEq)]
pub struct Inode {
    pub uid: i32,
    pub gid: i32,
    /// 文件字节数；目录为其块内容量之和
    pub size: i32,
    pub atime: f32,
    pub ctime: f32,
    pub mtime: f32,
    pub block: [i32; 15],
    pub kind: InodeKind,
    /// 八进制权限的三个 ASCII 数字
    pub perm: [u8; 3],
}

impl Inode {
    /// 默认权限，与引导内容保持一致
    pub const DEFAULT_PERM: [u8; 3] = *b"664";

    pub fn new(uid: i32, gid: i32, size: i32, kind: InodeKind, now: f32) -> Self {
        Self {
            uid,
            gid,
            size,
            atime: now,
            ctime: now,
            mtime: now,
            block: [-1; 15],
            kind,
            perm: Self::DEFAULT_PERM,
        }
    }

    #[inline]
    pub fn is_folder(&self) -> bool {
        self.kind == InodeKind::Folder
    }

    /// 已占用的直接块索引
    pub fn direct_blocks(&self) -> impl Iterator<Item = i32> + '_ {
        self.block[..DIRECT_BLOCKS]
            .iter()
            .copied()
            .take_while(|&b| b != -1)
    }

    /// 首个空闲的直接格
    pub fn free_direct_slot(&self) -> Option<usize> {
        self.block[..DIRECT_BLOCKS].iter().position(|&b| b == -1)
    }
}

impl Record for Inode {
    const SIZE: usize = 6 * 4 + 15 * 4 + 1 + 3;

    fn encode(&self, buf: &mut [u8]) {
        let mut w = Writer::new(buf);
        w.i32(self.uid);
        w.i32(self.gid);
        w.i32(self.size);
        w.f32(self.atime);
        w.f32(self.ctime);
        w.f32(self.mtime);
        for b in self.block {
            w.i32(b);
        }
        w.byte(self.kind as u8);
        w.bytes(&self.perm);
    }

    fn decode(buf: &[u8]) -> Self {
        let mut r = Reader::new(buf);
        Self {
            uid: r.i32(),
            gid: r.i32(),
            size: r.i32(),
            atime: r.f32(),
            ctime: r.f32(),
            mtime: r.f32(),
            block: std::array::from_fn(|_| r.i32()),
            kind: InodeKind::from_byte(r.byte()),
            perm: r.bytes(),
        }
    }
}
