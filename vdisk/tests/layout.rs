//! 记录尺寸与编解码回环：镜像由同一套编解码读回，
//! 尺寸错一个字节整个格式就废了。

use vdisk::layout::{
    Ebr, FileBlock, Fit, FolderBlock, Inode, InodeKind, Mbr, PartKind, Partition, Record,
    SuperBlock,
};

#[test]
fn record_sizes() {
    assert_eq!(35, Partition::SIZE);
    assert_eq!(153, Mbr::SIZE);
    assert_eq!(34, Ebr::SIZE);
    assert_eq!(68, SuperBlock::SIZE);
    assert_eq!(88, <Inode as Record>::SIZE);
    assert_eq!(64, <FolderBlock as Record>::SIZE);
    assert_eq!(64, FileBlock::SIZE);
}

fn round_trip<R: Record + PartialEq + std::fmt::Debug>(record: R) {
    let mut buf = vec![0u8; R::SIZE];
    record.encode(&mut buf);
    assert_eq!(record, R::decode(&buf));
}

#[test]
fn mbr_round_trip() {
    let mut mbr = Mbr::new(5 * 1024 * 1024, 1700000000.0, 12345, Fit::Worst);
    mbr.partitions[0].create(153, 2 * 1024 * 1024, PartKind::Primary, Fit::First, "P1");
    mbr.partitions[1].create(
        153 + 2 * 1024 * 1024,
        1024 * 1024,
        PartKind::Extended,
        Fit::Best,
        "E1",
    );
    mbr.partitions[0].mount(1, "671A");
    round_trip(mbr);
}

#[test]
fn ebr_round_trip() {
    let mut ebr = Ebr::new(2097305, 512 * 1024, Fit::Worst, "L1");
    ebr.next = 2621593;
    ebr.mount("672A");
    round_trip(ebr);
}

#[test]
fn super_block_round_trip() {
    let geo = vdisk::layout::Geometry::compute(153, 2 * 1024 * 1024);
    let sb = SuperBlock::new(&geo, 2, 1700000000.0);
    round_trip(sb);
}

#[test]
fn inode_round_trip() {
    let mut inode = Inode::new(1, 1, 27, InodeKind::File, 1700000000.0);
    inode.block[0] = 1;
    round_trip(inode);
}

#[test]
fn folder_block_round_trip() {
    let mut block = FolderBlock::new_dir(0, 0);
    block.entries[2] = vdisk::layout::FolderEntry::new("users.txt", 1);
    round_trip(block);
}

#[test]
fn file_block_round_trip() {
    round_trip(FileBlock::from_chunk(b"1,G,root\n"));
}

#[test]
fn geometry_matches_formula() {
    // n = (S - 68) / 284，位图每实体一字节
    let geo = vdisk::layout::Geometry::compute(0, 2 * 1024 * 1024);
    assert_eq!(geo.n, (2 * 1024 * 1024 - 68) / 284);
    assert_eq!(geo.bm_block_start - geo.bm_inode_start, geo.n);
    assert_eq!(geo.inode_start - geo.bm_block_start, 3 * geo.n);
    assert_eq!(geo.block_start - geo.inode_start, geo.n * 88);
}
