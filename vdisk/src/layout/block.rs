use crate::codec::{Reader, Writer};
use crate::layout::{pack_name, unpack_name, Record};

/// 目录项名字的定宽
const ENTRY_NAME_LEN: usize = 12;

/// 目录块的一格：定宽名字 + inode 索引（-1 为空格）
#[derive(Debug, Clone, PartialEq)]
pub struct FolderEntry {
    pub name: [u8; ENTRY_NAME_LEN],
    pub inode: i32,
}

impl FolderEntry {
    pub const SIZE: usize = ENTRY_NAME_LEN + 4;

    pub fn new(name: &str, inode: i32) -> Self {
        Self {
            name: pack_name(name),
            inode,
        }
    }

    pub fn empty() -> Self {
        Self {
            name: [0; ENTRY_NAME_LEN],
            inode: -1,
        }
    }

    #[inline]
    pub fn is_used(&self) -> bool {
        self.inode != -1
    }

    pub fn name(&self) -> String {
        unpack_name(&self.name)
    }
}

/// 目录块：四格，前两格恒为 `.` 与 `..`，子项只占 2、3 两格
#[derive(Debug, Clone, PartialEq)]
pub struct FolderBlock {
    pub entries: [FolderEntry; 4],
}

/// 子项格的下标范围
pub(crate) const CHILD_SLOTS: std::ops::Range<usize> = 2..4;

impl FolderBlock {
    /// 新目录的首个块：`.` 指向自身，`..` 指向父目录
    pub fn new_dir(self_inode: i32, parent_inode: i32) -> Self {
        Self {
            entries: [
                FolderEntry::new(".", self_inode),
                FolderEntry::new("..", parent_inode),
                FolderEntry::empty(),
                FolderEntry::empty(),
            ],
        }
    }

    /// 在子项格里找名字
    pub fn find(&self, name: &str) -> Option<i32> {
        self.entries
            .iter()
            .find(|e| e.is_used() && e.name() == name)
            .map(|e| e.inode)
    }

    /// 首个空闲子项格
    pub fn free_child_slot(&self) -> Option<usize> {
        CHILD_SLOTS.clone().find(|&i| !self.entries[i].is_used())
    }
}

impl Record for FolderBlock {
    const SIZE: usize = 4 * FolderEntry::SIZE;

    fn encode(&self, buf: &mut [u8]) {
        let mut w = Writer::new(buf);
        for e in &self.entries {
            w.bytes(&e.name);
            w.i32(e.inode);
        }
    }

    fn decode(buf: &[u8]) -> Self {
        let mut r = Reader::new(buf);
        Self {
            entries: std::array::from_fn(|_| FolderEntry {
                name: r.bytes(),
                inode: r.i32(),
            }),
        }
    }
}

/// 文件块与目录块共用的块宽
const BLOCK_BYTES: usize = 64;

/// 文件块：64 字节裸内容
#[derive(Debug, Clone, PartialEq)]
pub struct FileBlock {
    pub content: [u8; BLOCK_BYTES],
}

impl FileBlock {
    pub const SIZE: usize = BLOCK_BYTES;

    /// 不足一块的内容 NUL 填充
    pub fn from_chunk(chunk: &[u8]) -> Self {
        let mut content = [0u8; Self::SIZE];
        content[..chunk.len()].copy_from_slice(chunk);
        Self { content }
    }
}

impl Record for FileBlock {
    const SIZE: usize = BLOCK_BYTES;

    fn encode(&self, buf: &mut [u8]) {
        buf[..Self::SIZE].copy_from_slice(&self.content);
    }

    fn decode(buf: &[u8]) -> Self {
        let mut content = [0u8; Self::SIZE];
        content.copy_from_slice(&buf[..Self::SIZE]);
        Self { content }
    }
}
