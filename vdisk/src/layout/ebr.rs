use crate::codec::{Reader, Writer};
use crate::layout::mbr::EMPTY_ID;
use crate::layout::{pack_name, unpack_name, Fit, Record, SlotStatus};

/// 逻辑分区头：位于自身区域的起始处，数据紧随其后。
/// `next` 是下一个 EBR 的绝对字节偏移，-1 终结链表。
#[derive(Debug, Clone, PartialEq)]
pub struct Ebr {
    pub status: SlotStatus,
    pub fit: Option<Fit>,
    pub start: i32,
    pub size: i32,
    pub next: i32,
    pub name: [u8; 16],
    pub id: [u8; 4],
}

impl Ebr {
    pub fn new(start: i32, size: i32, fit: Fit, name: &str) -> Self {
        Self {
            status: SlotStatus::Created,
            fit: Some(fit),
            start,
            size,
            next: -1,
            name: pack_name(name),
            id: EMPTY_ID,
        }
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

    pub fn mount(&mut self, id: &str) {
        self.status = SlotStatus::Mounted;
        self.id = pack_name(id);
    }

    /// 逻辑分区的可用区从 EBR 之后开始
    #[inline]
    pub fn payload_start(&self) -> i32 {
        self.start + Self::SIZE as i32
    }

    #[inline]
    pub fn payload_size(&self) -> i32 {
        self.size - Self::SIZE as i32
    }
}

impl Record for Ebr {
    const SIZE: usize = 1 + 1 + 4 + 4 + 4 + 16 + 4;

    fn encode(&self, buf: &mut [u8]) {
        let mut w = Writer::new(buf);
        w.byte(self.status as u8);
        w.byte(Fit::as_byte(self.fit));
        w.i32(self.start);
        w.i32(self.size);
        w.i32(self.next);
        w.bytes(&self.name);
        w.bytes(&self.id);
    }

    fn decode(buf: &[u8]) -> Self {
        let mut r = Reader::new(buf);
        Self {
            status: SlotStatus::from_byte(r.byte()),
            fit: Fit::from_byte(r.byte()),
            start: r.i32(),
            size: r.i32(),
            next: r.i32(),
            name: r.bytes(),
            id: r.bytes(),
        }
    }
}
