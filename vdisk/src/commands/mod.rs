//! # 命令分发层
//!
//! 词法分析（外部协作方）交来 token 列表；
//! 本层负责全部旗标级校验、默认值与路由，并产出人类可读的结果串。

mod parse;

mod disk_cmd;
mod fs_cmd;
mod acl_cmd;
mod rep_cmd;

use std::path::PathBuf;

use typed_bytesize::ByteSizeIec;

use crate::disk::PartitionType;
use crate::fs::ExtFileSystem;
use crate::image::ImageFile;
use crate::layout::Fit;
use crate::{MountTable, Result, Session};

/// mkdisk / fdisk 的尺寸单位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    K,
    M,
}

impl Unit {
    pub fn to_bytes(self, count: u32) -> u64 {
        match self {
            Unit::K => ByteSizeIec::kib(count as u64).0,
            Unit::M => ByteSizeIec::mib(count as u64).0,
        }
    }
}

/// mkfs 的 `-fs`；3fs 仅记录在超级块里
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsKind {
    Ext2,
    Ext3,
}

impl FsKind {
    pub fn fs_type(self) -> i32 {
        match self {
            FsKind::Ext2 => 2,
            FsKind::Ext3 => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FsKind::Ext2 => "2fs",
            FsKind::Ext3 => "3fs",
        }
    }
}

/// rep 的 `-name`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Mbr,
    Ebr,
    Disk,
    Inode,
    Block,
    BmInode,
    BmBlock,
    Tree,
    Sb,
    File,
    Ls,
}

impl ReportKind {
    pub fn label(self) -> &'static str {
        match self {
            ReportKind::Mbr => "mbr",
            ReportKind::Ebr => "ebr",
            ReportKind::Disk => "disk",
            ReportKind::Inode => "inode",
            ReportKind::Block => "block",
            ReportKind::BmInode => "bm_inode",
            ReportKind::BmBlock => "bm_block",
            ReportKind::Tree => "tree",
            ReportKind::Sb => "sb",
            ReportKind::File => "file",
            ReportKind::Ls => "ls",
        }
    }
}

/// 一行命令的结构化形态；全部旗标级不变量在 `from_tokens` 里落实
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Mkdisk {
        size: u32,
        unit: Unit,
        fit: Fit,
        path: PathBuf,
    },
    Rmdisk {
        path: PathBuf,
    },
    Fdisk {
        size: u32,
        unit: Unit,
        fit: Fit,
        kind: PartitionType,
        name: String,
        path: PathBuf,
    },
    Mount {
        path: PathBuf,
        name: String,
    },
    Mounted,
    Mkfs {
        id: String,
        fs: FsKind,
    },
    Login {
        user: String,
        pass: String,
        id: String,
    },
    Logout,
    Mkdir {
        path: String,
        parents: bool,
    },
    Mkfile {
        path: String,
        parents: bool,
        size: u32,
        cont: Option<String>,
    },
    Cat {
        files: Vec<String>,
    },
    Rmusr {
        user: String,
    },
    Rep {
        id: String,
        name: ReportKind,
        path: PathBuf,
        path_file_ls: Option<String>,
    },
}

/// 命令执行者：持有两份进程级状态（挂载表与会话），
/// 按引用递给各命令，不走环境全局。
#[derive(Debug, Default)]
pub struct Dispatcher {
    pub mounts: MountTable,
    pub session: Session,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exec(&mut self, cmd: Command) -> Result<String> {
        match cmd {
            Command::Mkdisk {
                size,
                unit,
                fit,
                path,
            } => disk_cmd::mkdisk(size, unit, fit, &path),
            Command::Rmdisk { path } => disk_cmd::rmdisk(&path),
            Command::Fdisk {
                size,
                unit,
                fit,
                kind,
                name,
                path,
            } => disk_cmd::fdisk(size, unit, fit, kind, &name, &path),
            Command::Mount { path, name } => disk_cmd::mount(self, &path, &name),
            Command::Mounted => disk_cmd::mounted(self),
            Command::Mkfs { id, fs } => fs_cmd::mkfs(self, &id, fs),
            Command::Login { user, pass, id } => acl_cmd::login(self, &user, &pass, &id),
            Command::Logout => acl_cmd::logout(self),
            Command::Mkdir { path, parents } => fs_cmd::mkdir(self, &path, parents),
            Command::Mkfile {
                path,
                parents,
                size,
                cont,
            } => fs_cmd::mkfile(self, &path, parents, size, cont.as_deref()),
            Command::Cat { files } => fs_cmd::cat(self, &files),
            Command::Rmusr { user } => acl_cmd::rmusr(self, &user),
            Command::Rep {
                id,
                name,
                path,
                path_file_ls,
            } => rep_cmd::rep(self, &id, name, &path, path_file_ls.as_deref()),
        }
    }

    /// 打开当前会话所在分区的文件系统
    pub(crate) fn session_fs(&self) -> Result<ExtFileSystem> {
        let mp = self.mounts.locate(&self.session.id)?;
        let image = ImageFile::open(&mp.path)?;
        ExtFileSystem::open(image, mp.fs_start)
    }
}
