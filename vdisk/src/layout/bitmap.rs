use crate::image::ImageFile;
use crate::Result;

/// 空闲格
const FREE: u8 = b'0';
/// 已用格
const USED: u8 = b'1';

/// 位图区域：每个实体一个**字节**（'0' 空闲，'1' 已用）。
/// 镜像格式如此规定，不得压缩成比特。
#[derive(Debug, Clone, Copy)]
pub struct Bitmap {
    /// 位图在镜像内的起始字节
    start: u64,
    /// 格数
    cells: u32,
}

impl Bitmap {
    #[inline]
    pub fn new(start: i32, cells: i32) -> Self {
        Self {
            start: start as u64,
            cells: cells as u32,
        }
    }

    /// mkfs 时整片置 '0'
    pub fn format(&self, image: &ImageFile) -> Result<()> {
        let buf = vec![FREE; self.cells as usize];
        image.write_at(self.start, &buf)
    }

    /// 线性扫描首个空闲格，置 '1' 并返回其下标。
    /// 配额用尽则返回空。
    pub fn alloc(&self, image: &ImageFile) -> Result<Option<u32>> {
        let mut buf = vec![0u8; self.cells as usize];
        image.read_at(self.start, &mut buf)?;

        let Some(index) = buf.iter().position(|&c| c == FREE) else {
            return Ok(None);
        };

        image.write_at(self.start + index as u64, &[USED])?;
        Ok(Some(index as u32))
    }

    /// 读出整片位图（报表与校验用）
    pub fn cells(&self, image: &ImageFile) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.cells as usize];
        image.read_at(self.start, &mut buf)?;
        Ok(buf)
    }

    pub fn count_used(&self, image: &ImageFile) -> Result<u32> {
        let buf = self.cells(image)?;
        Ok(buf.iter().filter(|&&c| c == USED).count() as u32)
    }
}
