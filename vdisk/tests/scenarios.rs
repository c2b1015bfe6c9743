//! 端到端场景：每个用例一张独立镜像，命令按字面喂给分发器。

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

use vdisk::layout::{Ebr, Mbr, Record, SlotStatus, SuperBlock};
use vdisk::{Command, Dispatcher, Error, ImageFile};

/// 每个用例独享的镜像路径
fn temp_image(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("vdisk-tests-{}", process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

/// 与交互壳相同的切词规则（双引号内空格保留）
fn tokens(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ' ' if !in_quotes => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn run(d: &mut Dispatcher, line: &str) -> vdisk::Result<String> {
    Command::from_tokens(&tokens(line)).and_then(|cmd| d.exec(cmd))
}

fn ok(d: &mut Dispatcher, line: &str) -> String {
    match run(d, line) {
        Ok(msg) => msg,
        Err(e) => panic!("'{line}' falló: {e}"),
    }
}

/// 建盘、分区、格式化并登录 root 的常用前奏
fn format_and_login(d: &mut Dispatcher, img: &str) -> PathBuf {
    let path = temp_image(img);
    ok(d, &format!("mkdisk -size=5 -unit=M -path={}", path.display()));
    ok(
        d,
        &format!("fdisk -size=2 -unit=M -type=P -name=P1 -path={}", path.display()),
    );
    ok(d, &format!("mount -path={} -name=P1", path.display()));
    ok(d, "mkfs -id=671A -type=full -fs=2fs");
    ok(d, "login -user=root -pass=123 -id=671A");
    path
}

#[test]
fn s1_disk_partition_mount() {
    let mut d = Dispatcher::new();
    let path = temp_image("s1.mia");

    ok(&mut d, &format!("mkdisk -size=5 -unit=M -path={}", path.display()));
    ok(
        &mut d,
        &format!("fdisk -size=2 -unit=M -type=P -name=P1 -path={}", path.display()),
    );
    let msg = ok(&mut d, &format!("mount -path={} -name=P1", path.display()));
    assert_eq!(msg, "MOUNT: Partición P1 montada correctamente con ID: 671A");

    // 表里恰好一个ID，对应盘上的 '1' 槽位
    assert_eq!(d.mounts.ids(), vec!["671A".to_string()]);
    let image = ImageFile::open(&path).unwrap();
    let mbr = Mbr::read_from(&image, 0).unwrap();
    let mounted = mbr
        .partitions
        .iter()
        .filter(|p| p.status == SlotStatus::Mounted)
        .count();
    assert_eq!(mounted, d.mounts.len());
}

#[test]
fn s2_format_and_login() {
    let mut d = Dispatcher::new();
    let path = temp_image("s2.mia");
    ok(&mut d, &format!("mkdisk -size=5 -unit=M -path={}", path.display()));
    ok(
        &mut d,
        &format!("fdisk -size=2 -unit=M -type=P -name=P1 -path={}", path.display()),
    );
    ok(&mut d, &format!("mount -path={} -name=P1", path.display()));
    ok(&mut d, "mkfs -id=671A -type=full -fs=2fs");

    let msg = ok(&mut d, "login -user=root -pass=123 -id=671A");
    assert_eq!(msg, "LOGIN: Sesión iniciada como root en 671A");

    // 会话已占用：第二次登录被状态机拒绝
    let err = run(&mut d, "login -user=root -pass=123 -id=671A").unwrap_err();
    assert!(matches!(err, Error::StateViolation(_)));

    // 引导内容可读回
    assert_eq!(ok(&mut d, "cat -file1=/users.txt"), "1,G,root\n1,U,root,root,123\n");
}

#[test]
fn s3_mkfile_with_parents() {
    let mut d = Dispatcher::new();
    format_and_login(&mut d, "s3.mia");

    // 无 -r 且父目录缺失
    let err = run(&mut d, "mkfile -path=/a/b/c.txt -cont=\"hello\"").unwrap_err();
    assert!(matches!(err, Error::ParentMissing(_)));

    ok(&mut d, "mkfile -r -path=/a/b/c.txt -cont=\"hello\"");
    assert_eq!(ok(&mut d, "cat -file1=/a/b/c.txt"), "hello");
}

#[test]
fn s4_extended_and_logicals() {
    let mut d = Dispatcher::new();
    let path = temp_image("s4.mia");
    ok(&mut d, &format!("mkdisk -size=5 -unit=M -path={}", path.display()));
    ok(
        &mut d,
        &format!("fdisk -size=2 -unit=M -type=E -name=E1 -path={}", path.display()),
    );
    ok(
        &mut d,
        &format!("fdisk -size=500 -unit=K -type=L -name=L1 -path={}", path.display()),
    );
    ok(
        &mut d,
        &format!("fdisk -size=500 -unit=K -type=L -name=L2 -path={}", path.display()),
    );

    let image = ImageFile::open(&path).unwrap();
    let mbr = Mbr::read_from(&image, 0).unwrap();
    let extended = mbr.extended().expect("E1 debe existir");

    // L1 的 EBR 在 E1 起点；L2 紧贴 L1 区域之后
    let l1 = Ebr::read_from(&image, extended.start as u64).unwrap();
    assert_eq!(l1.name(), "L1");
    assert_eq!(l1.start, extended.start);
    assert_eq!(l1.size, 500 * 1024);
    assert_eq!(l1.next, l1.start + l1.size);

    let l2 = Ebr::read_from(&image, l1.next as u64).unwrap();
    assert_eq!(l2.name(), "L2");
    assert_eq!(l2.start, l1.start + l1.size);
    assert_eq!(l2.next, -1);
}

#[test]
fn s5_rmusr_missing_user() {
    let mut d = Dispatcher::new();
    format_and_login(&mut d, "s5.mia");

    let before = ok(&mut d, "cat -file1=/users.txt");
    let err = run(&mut d, "rmusr -user=user1").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    // users.txt 原封不动
    assert_eq!(ok(&mut d, "cat -file1=/users.txt"), before);
}

#[test]
fn s6_duplicate_partition_name() {
    let mut d = Dispatcher::new();
    let path = temp_image("s6.mia");
    ok(&mut d, &format!("mkdisk -size=5 -unit=M -path={}", path.display()));
    ok(
        &mut d,
        &format!("fdisk -size=1 -unit=M -type=P -name=P1 -path={}", path.display()),
    );
    let err = run(
        &mut d,
        &format!("fdisk -size=1 -unit=M -type=P -name=P1 -path={}", path.display()),
    )
    .unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));

    // 第二槽位保持空
    let image = ImageFile::open(&path).unwrap();
    let mbr = Mbr::read_from(&image, 0).unwrap();
    assert!(!mbr.partitions[1].is_used());
}

#[test]
fn mkfs_counters_and_bitmaps_agree() {
    let mut d = Dispatcher::new();
    let path = format_and_login(&mut d, "invariants.mia");

    let image = ImageFile::open(&path).unwrap();
    let mbr = Mbr::read_from(&image, 0).unwrap();
    let p = &mbr.partitions[0];
    let sb = SuperBlock::read_from(&image, p.start as u64).unwrap();
    let n = sb.inode_quota();

    // 引导后：根目录 + users.txt
    assert_eq!(sb.inodes_count, 2);
    assert_eq!(sb.blocks_count, 2);
    assert_eq!(sb.inodes_count + sb.free_inodes_count, n);
    assert_eq!(sb.blocks_count + sb.free_blocks_count, 3 * n);

    // 位图与计数器一致
    let mut bm = vec![0u8; n as usize];
    image.read_at(sb.bm_inode_start as u64, &mut bm).unwrap();
    assert_eq!(bm.iter().filter(|&&c| c == b'1').count() as i32, sb.inodes_count);
    let mut bm = vec![0u8; 3 * n as usize];
    image.read_at(sb.bm_block_start as u64, &mut bm).unwrap();
    assert_eq!(bm.iter().filter(|&&c| c == b'1').count() as i32, sb.blocks_count);

    // 根目录的块0：`.` 与 `..` 都指向 inode 0
    let blk = vdisk::layout::FolderBlock::read_from(&image, sb.block_start as u64).unwrap();
    assert_eq!(blk.entries[0].name(), ".");
    assert_eq!(blk.entries[0].inode, 0);
    assert_eq!(blk.entries[1].name(), "..");
    assert_eq!(blk.entries[1].inode, 0);
}

#[test]
fn logicals_get_sequential_ids() {
    let mut d = Dispatcher::new();
    let path = temp_image("ids.mia");
    ok(&mut d, &format!("mkdisk -size=5 -unit=M -path={}", path.display()));
    ok(
        &mut d,
        &format!("fdisk -size=1 -unit=M -type=P -name=P1 -path={}", path.display()),
    );
    ok(
        &mut d,
        &format!("fdisk -size=2 -unit=M -type=E -name=E1 -path={}", path.display()),
    );
    ok(
        &mut d,
        &format!("fdisk -size=500 -unit=K -type=L -name=L1 -path={}", path.display()),
    );

    assert!(ok(&mut d, &format!("mount -path={} -name=P1", path.display())).ends_with("671A"));
    assert!(ok(&mut d, &format!("mount -path={} -name=L1", path.display())).ends_with("672A"));
    assert_eq!(d.mounts.ids(), vec!["671A".to_string(), "672A".to_string()]);

    // 挂载扩展分区被状态机拒绝
    let err = run(&mut d, &format!("mount -path={} -name=E1", path.display())).unwrap_err();
    assert!(matches!(err, Error::StateViolation(_)));
}

#[test]
fn mkfs_on_logical_partition() {
    let mut d = Dispatcher::new();
    let path = temp_image("logfs.mia");
    ok(&mut d, &format!("mkdisk -size=5 -unit=M -path={}", path.display()));
    ok(
        &mut d,
        &format!("fdisk -size=3 -unit=M -type=E -name=E1 -path={}", path.display()),
    );
    ok(
        &mut d,
        &format!("fdisk -size=2 -unit=M -type=L -name=L1 -path={}", path.display()),
    );
    ok(&mut d, &format!("mount -path={} -name=L1", path.display()));
    ok(&mut d, "mkfs -id=671A");
    ok(&mut d, "login -user=root -pass=123 -id=671A");
    assert_eq!(ok(&mut d, "cat -file1=/users.txt"), "1,G,root\n1,U,root,root,123\n");

    // 超级块躲开了 EBR：落在其后
    let image = ImageFile::open(&path).unwrap();
    let mbr = Mbr::read_from(&image, 0).unwrap();
    let ext = mbr.extended().unwrap();
    let ebr = Ebr::read_from(&image, ext.start as u64).unwrap();
    assert_eq!(ebr.id(), "671A");
    let sb = SuperBlock::read_from(&image, (ebr.start + Ebr::SIZE as i32) as u64).unwrap();
    assert!(sb.is_valid());
}

#[test]
fn rmusr_rewrites_users_file() {
    let mut d = Dispatcher::new();
    format_and_login(&mut d, "rmusr.mia");

    let err = run(&mut d, "rmusr -user=pepe").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    ok(&mut d, "rmusr -user=root");
    assert_eq!(ok(&mut d, "cat -file1=/users.txt"), "1,G,root\n0,U,root,root,123\n");

    // 删除后 root 无法再登录
    ok(&mut d, "logout");
    let err = run(&mut d, "login -user=root -pass=123 -id=671A").unwrap_err();
    assert!(matches!(err, Error::BadCredentials));
}

#[test]
fn mkfs_rejects_double_format_and_missing_id() {
    let mut d = Dispatcher::new();
    format_and_login(&mut d, "double.mia");

    let err = run(&mut d, "mkfs -id=671A").unwrap_err();
    assert!(matches!(err, Error::StateViolation(_)));

    let err = run(&mut d, "mkfs -id=999Z").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn mkdir_requires_session() {
    let mut d = Dispatcher::new();
    let path = temp_image("nosession.mia");
    ok(&mut d, &format!("mkdisk -size=5 -unit=M -path={}", path.display()));
    ok(
        &mut d,
        &format!("fdisk -size=2 -unit=M -type=P -name=P1 -path={}", path.display()),
    );
    ok(&mut d, &format!("mount -path={} -name=P1", path.display()));
    ok(&mut d, "mkfs -id=671A");

    let err = run(&mut d, "mkdir -path=/docs").unwrap_err();
    assert!(matches!(err, Error::StateViolation(_)));

    ok(&mut d, "login -user=root -pass=123 -id=671A");
    ok(&mut d, "mkdir -path=/docs");
    ok(&mut d, "mkdir -p -path=/docs/a/b");
    ok(&mut d, "mkfile -path=/docs/a/b/x.txt -size=70");
    // 70 个 '0'，跨两块
    let content = ok(&mut d, "cat -file1=/docs/a/b/x.txt");
    assert_eq!(content.len(), 70);
    assert!(content.bytes().all(|b| b == b'0'));
}

#[test]
fn rep_writes_dot_files() {
    let mut d = Dispatcher::new();
    format_and_login(&mut d, "rep.mia");
    let out = temp_image("rep_mbr.dot");

    ok(
        &mut d,
        &format!("rep -id=671A -name=mbr -path={}", out.display()),
    );
    let dot = fs::read_to_string(&out).unwrap();
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("REPORTE MBR"));

    let out = temp_image("rep_tree.dot");
    ok(
        &mut d,
        &format!("rep -id=671A -name=tree -path={}", out.display()),
    );
    let dot = fs::read_to_string(&out).unwrap();
    assert!(dot.contains("users.txt"));

    let err = run(
        &mut d,
        &format!("rep -id=671A -name=ls -path={}", out.display()),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)));
}
