//! # 报表层
//!
//! 把镜像内的结构渲染成 Graphviz DOT 文本（HTML 表格节点）。

use std::fmt::Write as _;

use crate::fs::ExtFileSystem;
use crate::image::ImageFile;
use crate::layout::{Bitmap, Ebr, Fit, Inode, Mbr, PartKind, Record, SuperBlock};
use crate::Result;

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn open_graph(out: &mut String) {
    out.push_str("digraph G {\n  node [shape=plaintext]\n");
}

fn close_graph(out: &mut String) {
    out.push_str("}\n");
}

fn row(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, "    <TR><TD>{key}</TD><TD>{}</TD></TR>", escape(value));
}

/// MBR 报表：头部字段、四个槽位，以及链上的逻辑分区
pub fn mbr(mbr: &Mbr, ebrs: &[Ebr]) -> String {
    let mut out = String::new();
    open_graph(&mut out);

    out.push_str("  mbr [label=<<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\">\n");
    out.push_str("    <TR><TD COLSPAN=\"2\">REPORTE MBR</TD></TR>\n");
    row(&mut out, "mbr_tamano", &mbr.size.to_string());
    row(&mut out, "mbr_fecha_creacion", &format!("{:.0}", mbr.creation_time));
    row(&mut out, "mbr_disk_signature", &mbr.signature.to_string());
    row(&mut out, "disk_fit", &(mbr.fit as u8 as char).to_string());
    for (i, p) in mbr.partitions.iter().enumerate() {
        let _ = writeln!(out, "    <TR><TD COLSPAN=\"2\">Partición {}</TD></TR>", i + 1);
        row(&mut out, "part_status", &(p.status as u8 as char).to_string());
        row(&mut out, "part_type", &(p.kind as u8 as char).to_string());
        row(&mut out, "part_fit", &(Fit::as_byte(p.fit) as char).to_string());
        row(&mut out, "part_start", &p.start.to_string());
        row(&mut out, "part_size", &p.size.to_string());
        row(&mut out, "part_name", &p.name());
    }
    out.push_str("  </TABLE>>];\n");

    for (i, e) in ebrs.iter().enumerate() {
        let _ = writeln!(
            out,
            "  ebr{i} [label=<<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\">"
        );
        let _ = writeln!(out, "    <TR><TD COLSPAN=\"2\">Partición Lógica</TD></TR>");
        row(&mut out, "part_status", &(e.status as u8 as char).to_string());
        row(&mut out, "part_fit", &(Fit::as_byte(e.fit) as char).to_string());
        row(&mut out, "part_start", &e.start.to_string());
        row(&mut out, "part_size", &e.size.to_string());
        row(&mut out, "part_next", &e.next.to_string());
        row(&mut out, "part_name", &e.name());
        out.push_str("  </TABLE>>];\n");
    }

    close_graph(&mut out);
    out
}

/// EBR 链报表：逐节点一张表，按 `next` 连边
pub fn ebr(ebrs: &[Ebr]) -> String {
    let mut out = String::new();
    open_graph(&mut out);
    for (i, e) in ebrs.iter().enumerate() {
        let _ = writeln!(
            out,
            "  ebr{i} [label=<<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\">"
        );
        let _ = writeln!(out, "    <TR><TD COLSPAN=\"2\">EBR {}</TD></TR>", e.name());
        row(&mut out, "part_start", &e.start.to_string());
        row(&mut out, "part_size", &e.size.to_string());
        row(&mut out, "part_next", &e.next.to_string());
        out.push_str("  </TABLE>>];\n");
        if i + 1 < ebrs.len() {
            let _ = writeln!(out, "  ebr{i} -> ebr{};", i + 1);
        }
    }
    close_graph(&mut out);
    out
}

/// 磁盘占用报表：按面积百分比排出 MBR、分区与空洞
pub fn disk(mbr: &Mbr, ebrs: &[Ebr]) -> String {
    let total = mbr.size as f64;
    let mut cells: Vec<String> = vec!["<TD>MBR</TD>".into()];
    let mut cursor = Mbr::SIZE as i32;

    let mut used: Vec<_> = mbr.partitions.iter().filter(|p| p.is_used()).collect();
    used.sort_by_key(|p| p.start);

    for p in used {
        if p.start > cursor {
            let pct = (p.start - cursor) as f64 / total * 100.0;
            cells.push(format!("<TD>Libre<BR/>{pct:.2}%</TD>"));
        }
        let pct = p.size as f64 / total * 100.0;
        if p.kind == PartKind::Extended {
            // 扩展分区拆成其内部的逻辑区
            let mut inner: Vec<String> = Vec::new();
            for e in ebrs {
                let lp = e.size as f64 / total * 100.0;
                inner.push(format!("<TD>EBR</TD><TD>Lógica<BR/>{lp:.2}%</TD>"));
            }
            cells.push(format!(
                "<TD><TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\"><TR><TD COLSPAN=\"{}\">Extendida<BR/>{pct:.2}%</TD></TR><TR>{}</TR></TABLE></TD>",
                (inner.len() * 2).max(1),
                if inner.is_empty() { "<TD>Libre</TD>".to_string() } else { inner.concat() },
            ));
        } else {
            cells.push(format!(
                "<TD>{}<BR/>{pct:.2}%</TD>",
                escape(&p.name())
            ));
        }
        cursor = p.start + p.size;
    }
    if (cursor as f64) < total {
        let pct = (total - cursor as f64) / total * 100.0;
        cells.push(format!("<TD>Libre<BR/>{pct:.2}%</TD>"));
    }

    let mut out = String::new();
    open_graph(&mut out);
    let _ = writeln!(
        out,
        "  disk [label=<<TABLE BORDER=\"1\" CELLBORDER=\"1\" CELLSPACING=\"0\"><TR>{}</TR></TABLE>>];",
        cells.concat()
    );
    close_graph(&mut out);
    out
}

/// 超级块报表
pub fn super_block(sb: &SuperBlock) -> String {
    let mut out = String::new();
    open_graph(&mut out);
    out.push_str("  sb [label=<<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\">\n");
    out.push_str("    <TR><TD COLSPAN=\"2\">REPORTE SUPERBLOQUE</TD></TR>\n");
    row(&mut out, "s_filesystem_type", &sb.fs_type.to_string());
    row(&mut out, "s_inodes_count", &sb.inodes_count.to_string());
    row(&mut out, "s_blocks_count", &sb.blocks_count.to_string());
    row(&mut out, "s_free_inodes_count", &sb.free_inodes_count.to_string());
    row(&mut out, "s_free_blocks_count", &sb.free_blocks_count.to_string());
    row(&mut out, "s_mtime", &format!("{:.0}", sb.mtime));
    row(&mut out, "s_umtime", &format!("{:.0}", sb.umtime));
    row(&mut out, "s_mnt_count", &sb.mnt_count.to_string());
    row(&mut out, "s_magic", &format!("{:#X}", sb.magic));
    row(&mut out, "s_inode_size", &sb.inode_size.to_string());
    row(&mut out, "s_block_size", &sb.block_size.to_string());
    row(&mut out, "s_first_ino", &sb.first_ino.to_string());
    row(&mut out, "s_first_blo", &sb.first_blo.to_string());
    row(&mut out, "s_bm_inode_start", &sb.bm_inode_start.to_string());
    row(&mut out, "s_bm_block_start", &sb.bm_block_start.to_string());
    row(&mut out, "s_inode_start", &sb.inode_start.to_string());
    row(&mut out, "s_block_start", &sb.block_start.to_string());
    out.push_str("  </TABLE>>];\n");
    close_graph(&mut out);
    out
}

fn inode_table(out: &mut String, index: i32, inode: &Inode) {
    let _ = writeln!(
        out,
        "  inode{index} [label=<<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\">"
    );
    let _ = writeln!(out, "    <TR><TD COLSPAN=\"2\">REPORTE INODO {index}</TD></TR>");
    row(out, "i_uid", &inode.uid.to_string());
    row(out, "i_gid", &inode.gid.to_string());
    row(out, "i_size", &inode.size.to_string());
    row(out, "i_atime", &format!("{:.0}", inode.atime));
    row(out, "i_ctime", &format!("{:.0}", inode.ctime));
    row(out, "i_mtime", &format!("{:.0}", inode.mtime));
    row(out, "i_type", &(inode.kind as u8 as char).to_string());
    row(out, "i_perm", &String::from_utf8_lossy(&inode.perm));
    out.push_str("    <TR><TD COLSPAN=\"2\">BLOQUES DIRECTOS</TD></TR>\n");
    for (j, b) in inode.block[..12].iter().enumerate() {
        row(out, &(j + 1).to_string(), &b.to_string());
    }
    out.push_str("    <TR><TD COLSPAN=\"2\">BLOQUES INDIRECTOS</TD></TR>\n");
    for (j, b) in inode.block[12..].iter().enumerate() {
        row(out, &(j + 13).to_string(), &b.to_string());
    }
    out.push_str("  </TABLE>>];\n");
}

/// 全部已分配 inode，相邻连边
pub fn inodes(fs: &ExtFileSystem) -> Result<String> {
    let mut out = String::new();
    open_graph(&mut out);
    let count = fs.sb.inodes_count;
    for i in 0..count {
        let inode = fs.read_inode(i)?;
        inode_table(&mut out, i, &inode);
        if i + 1 < count {
            let _ = writeln!(out, "  inode{i} -> inode{};", i + 1);
        }
    }
    close_graph(&mut out);
    Ok(out)
}

/// 全部在用块：目录块列目录项，文件块列文本内容
pub fn blocks(fs: &ExtFileSystem) -> Result<String> {
    let mut out = String::new();
    open_graph(&mut out);

    for i in 0..fs.sb.inodes_count {
        let inode = fs.read_inode(i)?;
        for blk in inode.direct_blocks() {
            if inode.is_folder() {
                let block = fs.read_folder_block(blk)?;
                let _ = writeln!(
                    out,
                    "  block{blk} [label=<<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\">"
                );
                let _ = writeln!(out, "    <TR><TD COLSPAN=\"2\">Bloque Carpeta {blk}</TD></TR>");
                out.push_str("    <TR><TD>b_name</TD><TD>b_inodo</TD></TR>\n");
                for entry in block.entries.iter().filter(|e| e.is_used()) {
                    row(&mut out, &escape(&entry.name()), &entry.inode.to_string());
                }
                out.push_str("  </TABLE>>];\n");
            } else {
                let block = fs.read_file_block(blk)?;
                let text = String::from_utf8_lossy(&block.content);
                let text = escape(text.trim_end_matches('\0')).replace('\n', "<BR/>");
                let _ = writeln!(
                    out,
                    "  block{blk} [label=<<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\">"
                );
                let _ = writeln!(out, "    <TR><TD>Bloque Archivo {blk}</TD></TR>");
                let _ = writeln!(out, "    <TR><TD>{text}</TD></TR>");
                out.push_str("  </TABLE>>];\n");
            }
        }
    }

    close_graph(&mut out);
    Ok(out)
}

/// 位图报表：'0'/'1' 格子，每行 20 格
pub fn bitmap(bm: &Bitmap, image: &ImageFile, title: &str) -> Result<String> {
    let cells = bm.cells(image)?;
    let mut out = String::new();
    open_graph(&mut out);
    out.push_str("  tbl [label=<<TABLE BORDER=\"1\" CELLBORDER=\"1\" CELLSPACING=\"0\">\n");
    let _ = writeln!(out, "    <TR><TD><B>{title}</B></TD></TR>");
    for (i, cell) in cells.iter().enumerate() {
        if i % 20 == 0 {
            out.push_str("    <TR>");
        }
        let _ = write!(out, "<TD>{}</TD>", *cell as char);
        if (i + 1) % 20 == 0 || i + 1 == cells.len() {
            out.push_str("</TR>\n");
        }
    }
    out.push_str("  </TABLE>>];\n");
    close_graph(&mut out);
    Ok(out)
}

/// 目录树：从根出发，目录节点列其子项并连边
pub fn tree(fs: &ExtFileSystem) -> Result<String> {
    let mut out = String::new();
    out.push_str("digraph Tree {\n  node [shape=box]\n");
    let mut visited = vec![false; fs.sb.inodes_count.max(0) as usize];
    walk_tree(fs, 0, "", &mut visited, &mut out)?;
    close_graph(&mut out);
    Ok(out)
}

fn walk_tree(
    fs: &ExtFileSystem,
    ino: i32,
    label: &str,
    visited: &mut [bool],
    out: &mut String,
) -> Result<()> {
    if let Some(seen) = visited.get_mut(ino as usize) {
        if *seen {
            return Ok(());
        }
        *seen = true;
    }

    let inode = fs.read_inode(ino)?;
    if !inode.is_folder() {
        let _ = writeln!(out, "  n{ino} [label=\"{}\"];", escape(label));
        return Ok(());
    }

    let _ = writeln!(out, "  n{ino} [label=\"{}/\"];", escape(label));
    for blk in inode.direct_blocks() {
        let block = fs.read_folder_block(blk)?;
        for entry in block.entries.iter().filter(|e| e.is_used()) {
            let name = entry.name();
            if name == "." || name == ".." {
                continue;
            }
            let _ = writeln!(out, "  n{ino} -> n{};", entry.inode);
            walk_tree(fs, entry.inode, &name, visited, out)?;
        }
    }
    Ok(())
}
