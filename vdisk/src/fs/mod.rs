//! # 文件系统层
//!
//! 构建分区内的布局并使用：
//! 超级块 | inode位图(n) | 块位图(3n) | inode表(n) | 块表(3n)

mod vfs;
pub use vfs::{ROOT_INODE, USERS_INODE};
pub(crate) use vfs::components;

use crate::image::ImageFile;
use crate::layout::{
    Bitmap, FileBlock, FolderBlock, Geometry, Inode, InodeKind, Record, SuperBlock,
};
use crate::users;
use crate::{now_f32, Error, Result};

pub struct ExtFileSystem {
    image: ImageFile,
    sb_offset: u64,
    pub sb: SuperBlock,
}

impl ExtFileSystem {
    /// mkfs：计算几何、清位图、建根目录与 /users.txt
    pub fn format(image: ImageFile, fs_start: i32, fs_size: i32, fs_type: i32) -> Result<Self> {
        let existing = SuperBlock::read_from(&image, fs_start as u64)?;
        if existing.is_valid() {
            return Err(Error::StateViolation("la partición ya está formateada".into()));
        }

        let geo = Geometry::compute(fs_start, fs_size);
        // 引导至少需要根目录与 users.txt 各一个 inode
        if geo.n < 2 {
            return Err(Error::NoSpace(
                "la partición es demasiado pequeña para formatear".into(),
            ));
        }
        log::debug!("mkfs: n={}, inicio={fs_start}", geo.n);

        let now = now_f32();
        let mut fs = Self {
            image,
            sb_offset: fs_start as u64,
            sb: SuperBlock::new(&geo, fs_type, now),
        };

        fs.inode_bitmap().format(&fs.image)?;
        fs.block_bitmap().format(&fs.image)?;

        // 根目录：inode 0，块 0，`.` 与 `..` 都指向自己
        let root_ino = fs.alloc_inode()?;
        let root_blk = fs.alloc_block()?;
        let mut root = Inode::new(1, 1, 0, InodeKind::Folder, now);
        root.block[0] = root_blk;
        fs.write_inode(root_ino, &root)?;
        fs.write_folder_block(root_blk, &FolderBlock::new_dir(root_ino, root_ino))?;

        // /users.txt：inode 1，引导用户表
        let content = users::BOOTSTRAP.as_bytes();
        let users_ino = fs.alloc_inode()?;
        let mut users_inode = Inode::new(1, 1, content.len() as i32, InodeKind::File, now);
        for (i, chunk) in content.chunks(FileBlock::SIZE).enumerate() {
            let blk = fs.alloc_block()?;
            users_inode.block[i] = blk;
            fs.write_file_block(blk, &FileBlock::from_chunk(chunk))?;
        }
        fs.write_inode(users_ino, &users_inode)?;
        fs.insert_child(root_ino, "users.txt", users_ino)?;

        fs.flush_sb()?;
        Ok(fs)
    }

    /// 打开已格式化的分区
    pub fn open(image: ImageFile, fs_start: i32) -> Result<Self> {
        let sb = SuperBlock::read_from(&image, fs_start as u64)?;
        if !sb.is_valid() {
            return Err(Error::StateViolation("la partición no está formateada".into()));
        }
        Ok(Self {
            image,
            sb_offset: fs_start as u64,
            sb,
        })
    }

    #[inline]
    pub fn image(&self) -> &ImageFile {
        &self.image
    }

    #[inline]
    pub fn inode_bitmap(&self) -> Bitmap {
        Bitmap::new(self.sb.bm_inode_start, self.sb.inode_quota())
    }

    #[inline]
    pub fn block_bitmap(&self) -> Bitmap {
        Bitmap::new(self.sb.bm_block_start, self.sb.block_quota())
    }

    /// 分配 inode：位图扫描首个 '0'，推进计数器与咨询指针
    pub fn alloc_inode(&mut self) -> Result<i32> {
        let Some(index) = self.inode_bitmap().alloc(&self.image)? else {
            return Err(Error::NoSpace("no quedan inodos libres".into()));
        };
        self.sb.inodes_count += 1;
        self.sb.free_inodes_count -= 1;
        self.sb.first_ino += self.sb.inode_size;
        Ok(index as i32)
    }

    pub fn alloc_block(&mut self) -> Result<i32> {
        let Some(index) = self.block_bitmap().alloc(&self.image)? else {
            return Err(Error::NoSpace("no quedan bloques libres".into()));
        };
        self.sb.blocks_count += 1;
        self.sb.free_blocks_count -= 1;
        self.sb.first_blo += self.sb.block_size;
        Ok(index as i32)
    }

    pub fn read_inode(&self, index: i32) -> Result<Inode> {
        Inode::read_from(&self.image, self.sb.inode_offset(index))
    }

    pub fn write_inode(&self, index: i32, inode: &Inode) -> Result<()> {
        inode.write_to(&self.image, self.sb.inode_offset(index))
    }

    pub fn read_folder_block(&self, index: i32) -> Result<FolderBlock> {
        FolderBlock::read_from(&self.image, self.sb.block_offset(index))
    }

    pub fn write_folder_block(&self, index: i32, block: &FolderBlock) -> Result<()> {
        block.write_to(&self.image, self.sb.block_offset(index))
    }

    pub fn read_file_block(&self, index: i32) -> Result<FileBlock> {
        FileBlock::read_from(&self.image, self.sb.block_offset(index))
    }

    pub fn write_file_block(&self, index: i32, block: &FileBlock) -> Result<()> {
        block.write_to(&self.image, self.sb.block_offset(index))
    }

    /// 命令收尾时把超级块写回
    pub fn flush_sb(&self) -> Result<()> {
        self.sb.write_to(&self.image, self.sb_offset)
    }
}
