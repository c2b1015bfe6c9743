use crate::codec::{Reader, Writer};
use crate::layout::{pack_name, unpack_name, Record};

/// 槽位状态：空槽 → 已创建 → 已挂载，不可回退
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SlotStatus {
    Empty = b'N',
    Created = b'0',
    Mounted = b'1',
}

impl SlotStatus {
    pub(crate) fn from_byte(b: u8) -> Self {
        match b {
            b'0' => Self::Created,
            b'1' => Self::Mounted,
            // 未初始化区域读出来是 0x00，与 'N' 同义
            _ => Self::Empty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PartKind {
    Primary = b'P',
    Extended = b'E',
    Empty = b'N',
}

impl PartKind {
    fn from_byte(b: u8) -> Self {
        match b {
            b'P' => Self::Primary,
            b'E' => Self::Extended,
            _ => Self::Empty,
        }
    }
}

/// 调整策略。按格式要求原样保存；放置本身始终是顺序的
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Fit {
    First = b'F',
    Best = b'B',
    Worst = b'W',
}

impl Fit {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'F' => Some(Self::First),
            b'B' => Some(Self::Best),
            b'W' => Some(Self::Worst),
            _ => None,
        }
    }

    #[inline]
    pub fn as_byte(fit: Option<Fit>) -> u8 {
        fit.map(|f| f as u8).unwrap_or(b'N')
    }
}

/// MBR 的一个分区槽位
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub status: SlotStatus,
    pub kind: PartKind,
    pub fit: Option<Fit>,
    /// 字节偏移；空槽为 -1
    pub start: i32,
    pub size: i32,
    pub name: [u8; 16],
    /// 挂载时铸造的 1 基序号，未挂载为 -1
    pub correlative: i32,
    /// 挂载ID；未挂载时填 'N'
    pub id: [u8; 4],
}

pub(crate) const EMPTY_ID: [u8; 4] = [b'N'; 4];

impl Partition {
    pub const SIZE: usize = 35;

    pub fn empty() -> Self {
        Self {
            status: SlotStatus::Empty,
            kind: PartKind::Empty,
            fit: None,
            start: -1,
            size: -1,
            name: pack_name("N"),
            correlative: -1,
            id: EMPTY_ID,
        }
    }

    /// fdisk 占用槽位
    pub fn create(&mut self, start: i32, size: i32, kind: PartKind, fit: Fit, name: &str) {
        self.status = SlotStatus::Created;
        self.kind = kind;
        self.fit = Some(fit);
        self.start = start;
        self.size = size;
        self.name = pack_name(name);
        self.correlative = -1;
        self.id = EMPTY_ID;
    }

    /// mount 激活槽位
    pub fn mount(&mut self, correlative: i32, id: &str) {
        self.status = SlotStatus::Mounted;
        self.correlative = correlative;
        self.id = pack_name(id);
    }

    #[inline]
    pub fn is_used(&self) -> bool {
        self.status != SlotStatus::Empty
    }

    pub fn name(&self) -> String {
        unpack_name(&self.name)
    }

    pub fn id(&self) -> String {
        unpack_name(&self.id)
    }

    fn encode_into(&self, w: &mut Writer<'_>) {
        w.byte(self.status as u8);
        w.byte(self.kind as u8);
        w.byte(Fit::as_byte(self.fit));
        w.i32(self.start);
        w.i32(self.size);
        w.bytes(&self.name);
        w.i32(self.correlative);
        w.bytes(&self.id);
    }

    fn decode_from(r: &mut Reader<'_>) -> Self {
        Self {
            status: SlotStatus::from_byte(r.byte()),
            kind: PartKind::from_byte(r.byte()),
            fit: Fit::from_byte(r.byte()),
            start: r.i32(),
            size: r.i32(),
            name: r.bytes(),
            correlative: r.i32(),
            id: r.bytes(),
        }
    }
}

/// 镜像头部：总大小、签名与四个分区槽位
#[derive(Debug, Clone, PartialEq)]
pub struct Mbr {
    /// 镜像总字节数
    pub size: i32,
    /// 创建时刻，Unix 秒压缩成 f32
    pub creation_time: f32,
    pub signature: i32,
    pub fit: Fit,
    pub partitions: [Partition; 4],
}

impl Mbr {
    pub fn new(size: i32, creation_time: f32, signature: i32, fit: Fit) -> Self {
        Self {
            size,
            creation_time,
            signature,
            fit,
            partitions: [
                Partition::empty(),
                Partition::empty(),
                Partition::empty(),
                Partition::empty(),
            ],
        }
    }

    /// 按名字查槽位（NUL 截断后精确比较）
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.partitions
            .iter()
            .position(|p| p.is_used() && p.name() == name)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Partition> {
        self.partitions
            .iter()
            .find(|p| p.status == SlotStatus::Mounted && p.id() == id)
    }

    pub fn extended(&self) -> Option<&Partition> {
        self.partitions
            .iter()
            .find(|p| p.is_used() && p.kind == PartKind::Extended)
    }

    /// 首个空槽位及其顺序放置点：
    /// 0号槽紧跟 MBR，其余紧跟前一已用槽的末尾
    pub fn first_free_slot(&self) -> Option<(usize, i32)> {
        let mut start = Self::SIZE as i32;
        for (idx, p) in self.partitions.iter().enumerate() {
            if !p.is_used() {
                return Some((idx, start));
            }
            start = p.start + p.size;
        }
        None
    }

    pub fn used_slots(&self) -> usize {
        self.partitions.iter().filter(|p| p.is_used()).count()
    }

    /// 本镜像已挂载槽位的最大序号；没有则为 0
    pub fn max_mounted_correlative(&self) -> i32 {
        self.partitions
            .iter()
            .filter(|p| p.status == SlotStatus::Mounted)
            .map(|p| p.correlative)
            .max()
            .unwrap_or(0)
    }
}

impl Record for Mbr {
    const SIZE: usize = 4 + 4 + 4 + 1 + 4 * Partition::SIZE;

    fn encode(&self, buf: &mut [u8]) {
        let mut w = Writer::new(buf);
        w.i32(self.size);
        w.f32(self.creation_time);
        w.i32(self.signature);
        w.byte(self.fit as u8);
        for p in &self.partitions {
            p.encode_into(&mut w);
        }
    }

    fn decode(buf: &[u8]) -> Self {
        let mut r = Reader::new(buf);
        Self {
            size: r.i32(),
            creation_time: r.f32(),
            signature: r.i32(),
            fit: Fit::from_byte(r.byte()).unwrap_or(Fit::First),
            partitions: std::array::from_fn(|_| Partition::decode_from(&mut r)),
        }
    }
}
