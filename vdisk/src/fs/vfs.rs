//! # 索引节点层
//!
//! 路径解析与目录、文件的增改。
//! 路径一律是绝对路径；目录项只住在各目录块的 2、3 两格。

use super::ExtFileSystem;
use crate::layout::{FileBlock, FolderBlock, FolderEntry, Inode, InodeKind, DIRECT_BLOCKS};
use crate::{now_f32, Error, Result};

/// 根目录恒为 inode 0
pub const ROOT_INODE: i32 = 0;

/// `/users.txt` 由 mkfs 安放在 inode 1
pub const USERS_INODE: i32 = 1;

/// 拆出非空路径组件
pub(crate) fn components(path: &str) -> Vec<&str> {
    path.split('/').filter(|c| !c.is_empty()).collect()
}

impl ExtFileSystem {
    /// 解析绝对路径到 inode 索引
    pub fn resolve(&self, path: &str) -> Result<i32> {
        let mut current = ROOT_INODE;
        for comp in components(path) {
            let inode = self.read_inode(current)?;
            if !inode.is_folder() {
                return Err(Error::NotADirectory(format!(
                    "'{comp}' cuelga de un archivo, no de un directorio"
                )));
            }
            current = self
                .lookup_child(&inode, comp)?
                .ok_or_else(|| Error::NotFound(format!("'{comp}' no existe en la ruta {path}")))?;
        }
        Ok(current)
    }

    /// 在目录的直接块里按名字找子项
    pub fn lookup_child(&self, dir: &Inode, name: &str) -> Result<Option<i32>> {
        for blk in dir.direct_blocks() {
            let block = self.read_folder_block(blk)?;
            if let Some(ino) = block.find(name) {
                return Ok(Some(ino));
            }
        }
        Ok(None)
    }

    /// 把 `{name, child}` 挂进父目录：
    /// 先找现有块的空格，没有再占父目录的下一个直接格
    pub fn insert_child(&mut self, parent_ino: i32, name: &str, child: i32) -> Result<()> {
        let mut parent = self.read_inode(parent_ino)?;

        for blk in parent.direct_blocks() {
            let mut block = self.read_folder_block(blk)?;
            if let Some(slot) = block.free_child_slot() {
                block.entries[slot] = FolderEntry::new(name, child);
                return self.write_folder_block(blk, &block);
            }
        }

        // 所有块都满：在首个空直接格上开新块
        let Some(slot) = parent.free_direct_slot() else {
            return Err(Error::NoSpace(format!(
                "el directorio no admite más entradas para '{name}'"
            )));
        };

        // 新块的 `..` 沿用本目录的父目录
        let first = self.read_folder_block(parent.block[0])?;
        let grandparent = first.entries[1].inode;

        let blk = self.alloc_block()?;
        let mut block = FolderBlock::new_dir(parent_ino, grandparent);
        block.entries[2] = FolderEntry::new(name, child);
        self.write_folder_block(blk, &block)?;

        parent.block[slot] = blk;
        self.write_inode(parent_ino, &parent)
    }

    /// 建一个子目录并返回其 inode
    pub fn create_dir(&mut self, parent_ino: i32, name: &str, uid: i32, gid: i32) -> Result<i32> {
        let parent = self.read_inode(parent_ino)?;
        if self.lookup_child(&parent, name)?.is_some() {
            return Err(Error::AlreadyExists(format!("'{name}' ya existe")));
        }

        let now = now_f32();
        let ino = self.alloc_inode()?;
        let blk = self.alloc_block()?;

        let mut inode = Inode::new(uid, gid, 0, InodeKind::Folder, now);
        inode.block[0] = blk;
        self.write_inode(ino, &inode)?;
        self.write_folder_block(blk, &FolderBlock::new_dir(ino, parent_ino))?;
        self.insert_child(parent_ino, name, ino)?;
        Ok(ino)
    }

    /// 逐组件走到目标目录；`create` 时补建缺失的中间目录
    pub fn resolve_dir(
        &mut self,
        dirs: &[&str],
        create: bool,
        uid: i32,
        gid: i32,
    ) -> Result<i32> {
        let mut current = ROOT_INODE;
        for &comp in dirs {
            let inode = self.read_inode(current)?;
            if !inode.is_folder() {
                return Err(Error::NotADirectory(format!(
                    "'{comp}' cuelga de un archivo, no de un directorio"
                )));
            }
            current = match self.lookup_child(&inode, comp)? {
                Some(ino) => ino,
                None if create => self.create_dir(current, comp, uid, gid)?,
                None => {
                    return Err(Error::ParentMissing(format!(
                        "el directorio padre '{comp}' no existe"
                    )))
                }
            };
        }
        Ok(current)
    }

    /// 建文件：内容切成 64 字节块，最多 12 个直接块
    pub fn create_file(
        &mut self,
        parent_ino: i32,
        name: &str,
        uid: i32,
        gid: i32,
        content: &[u8],
    ) -> Result<i32> {
        let parent = self.read_inode(parent_ino)?;
        if self.lookup_child(&parent, name)?.is_some() {
            return Err(Error::AlreadyExists(format!("'{name}' ya existe")));
        }

        let now = now_f32();
        let ino = self.alloc_inode()?;
        let mut inode = Inode::new(uid, gid, content.len() as i32, InodeKind::File, now);
        self.write_chunks(&mut inode, content)?;
        self.write_inode(ino, &inode)?;
        self.insert_child(parent_ino, name, ino)?;
        Ok(ino)
    }

    /// 读出整个文件（按 inode.size 截断尾部 NUL）
    pub fn read_file(&self, ino: i32) -> Result<Vec<u8>> {
        let inode = self.read_inode(ino)?;
        if inode.is_folder() {
            return Err(Error::IsADirectory("la ruta es un directorio".into()));
        }

        let mut out = Vec::with_capacity(inode.size as usize);
        for blk in inode.direct_blocks() {
            let block = self.read_file_block(blk)?;
            out.extend_from_slice(&block.content);
        }
        out.truncate(inode.size as usize);
        Ok(out)
    }

    /// 原地改写文件：能复用的块照旧，长出来才分配
    pub fn rewrite_file(&mut self, ino: i32, content: &[u8]) -> Result<()> {
        let mut inode = self.read_inode(ino)?;
        if inode.is_folder() {
            return Err(Error::IsADirectory("la ruta es un directorio".into()));
        }

        self.write_chunks(&mut inode, content)?;
        inode.size = content.len() as i32;
        inode.mtime = now_f32();
        self.write_inode(ino, &inode)
    }

    fn write_chunks(&mut self, inode: &mut Inode, content: &[u8]) -> Result<()> {
        let chunks: Vec<&[u8]> = content.chunks(FileBlock::SIZE).collect();
        if chunks.len() > DIRECT_BLOCKS {
            return Err(Error::Unsupported(
                "el contenido excede los 12 bloques directos (sin indirección)",
            ));
        }
        for (i, chunk) in chunks.into_iter().enumerate() {
            if inode.block[i] == -1 {
                inode.block[i] = self.alloc_block()?;
            }
            self.write_file_block(inode.block[i], &FileBlock::from_chunk(chunk))?;
        }
        Ok(())
    }
}
