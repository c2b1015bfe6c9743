//! 旗标解析：`-clave=valor` 列表 → [`Command`]。
//! 旗标名不分大小写；带引号的值可含空格，引号在此剥除。

use std::path::PathBuf;

use super::{Command, FsKind, ReportKind, Unit};
use crate::disk::PartitionType;
use crate::layout::Fit;
use crate::{Error, Result};

/// 提取顺序无关的旗标集合；重复旗标以最后一次为准
struct Flags {
    pairs: Vec<(String, Option<String>)>,
}

impl Flags {
    fn parse(tokens: &[String]) -> Result<Self> {
        let mut pairs = Vec::new();
        for token in tokens {
            let Some(body) = token.strip_prefix('-') else {
                return Err(Error::ArgParse(format!("parámetro inválido: {token}")));
            };
            match body.split_once('=') {
                Some((key, value)) => {
                    pairs.push((key.to_lowercase(), Some(unquote(value).to_string())));
                }
                None => pairs.push((body.to_lowercase(), None)),
            }
        }
        Ok(Self { pairs })
    }

    /// 取值旗标
    fn take(&mut self, key: &str) -> Result<Option<String>> {
        let mut found = None;
        self.pairs.retain(|(k, v)| {
            if k == key {
                found = Some(v.clone());
                false
            } else {
                true
            }
        });
        match found {
            Some(Some(v)) => Ok(Some(v)),
            Some(None) => Err(Error::ArgParse(format!("el parámetro -{key} requiere valor"))),
            None => Ok(None),
        }
    }

    fn require(&mut self, key: &str) -> Result<String> {
        self.take(key)?
            .ok_or_else(|| Error::ArgParse(format!("faltan parámetros requeridos: -{key}")))
    }

    /// 布尔旗标（`-p`、`-r`）
    fn take_switch(&mut self, key: &str) -> bool {
        let mut found = false;
        self.pairs.retain(|(k, v)| {
            if k == key && v.is_none() {
                found = true;
                false
            } else {
                true
            }
        });
        found
    }

    /// `-file1`、`-file2`… 按序号排好收集
    fn take_numbered(&mut self, prefix: &str) -> Vec<String> {
        let mut numbered: Vec<(u32, String)> = Vec::new();
        self.pairs.retain(|(k, v)| {
            if let (Some(n), Some(v)) = (k.strip_prefix(prefix).and_then(|s| s.parse().ok()), v) {
                numbered.push((n, v.clone()));
                false
            } else {
                true
            }
        });
        numbered.sort_by_key(|(n, _)| *n);
        numbered.into_iter().map(|(_, v)| v).collect()
    }

    /// 不认识的旗标一律报错
    fn finish(self) -> Result<()> {
        match self.pairs.first() {
            Some((key, _)) => Err(Error::ArgParse(format!("parámetro desconocido: -{key}"))),
            None => Ok(()),
        }
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn parse_positive(raw: &str) -> Result<u32> {
    match raw.parse::<i64>() {
        Ok(n) if n > 0 && n <= u32::MAX as i64 => Ok(n as u32),
        _ => Err(Error::ArgParse(
            "el tamaño debe ser un número entero positivo".into(),
        )),
    }
}

fn parse_non_negative(raw: &str) -> Result<u32> {
    match raw.parse::<i64>() {
        Ok(n) if (0..=u32::MAX as i64).contains(&n) => Ok(n as u32),
        _ => Err(Error::ArgParse(format!("tamaño inválido: {raw}"))),
    }
}

fn parse_unit(raw: &str) -> Result<Unit> {
    match raw.to_uppercase().as_str() {
        "K" => Ok(Unit::K),
        "M" => Ok(Unit::M),
        _ => Err(Error::ArgParse("la unidad debe ser K o M".into())),
    }
}

fn parse_fit(raw: &str) -> Result<Fit> {
    match raw.to_uppercase().as_str() {
        "FF" => Ok(Fit::First),
        "BF" => Ok(Fit::Best),
        "WF" => Ok(Fit::Worst),
        _ => Err(Error::ArgParse("el ajuste debe ser BF, FF o WF".into())),
    }
}

fn parse_part_type(raw: &str) -> Result<PartitionType> {
    match raw.to_uppercase().as_str() {
        "P" => Ok(PartitionType::Primary),
        "E" => Ok(PartitionType::Extended),
        "L" => Ok(PartitionType::Logical),
        _ => Err(Error::ArgParse("el tipo debe ser P, E o L".into())),
    }
}

fn parse_fs(raw: &str) -> Result<FsKind> {
    match raw.to_lowercase().as_str() {
        "2fs" => Ok(FsKind::Ext2),
        "3fs" => Ok(FsKind::Ext3),
        _ => Err(Error::ArgParse("el fs debe ser 2fs o 3fs".into())),
    }
}

fn parse_report(raw: &str) -> Result<ReportKind> {
    match raw.to_lowercase().as_str() {
        "mbr" => Ok(ReportKind::Mbr),
        "ebr" => Ok(ReportKind::Ebr),
        "disk" => Ok(ReportKind::Disk),
        "inode" => Ok(ReportKind::Inode),
        "block" => Ok(ReportKind::Block),
        "bm_inode" => Ok(ReportKind::BmInode),
        "bm_block" => Ok(ReportKind::BmBlock),
        "tree" => Ok(ReportKind::Tree),
        "sb" => Ok(ReportKind::Sb),
        "file" => Ok(ReportKind::File),
        "ls" => Ok(ReportKind::Ls),
        _ => Err(Error::ArgParse(format!("reporte desconocido: {raw}"))),
    }
}

fn non_empty(key: &str, value: String) -> Result<String> {
    if value.is_empty() {
        Err(Error::ArgParse(format!("el {key} no puede estar vacío")))
    } else {
        Ok(value)
    }
}

impl Command {
    /// token 列表 → 命令；首 token 是命令名，不分大小写
    pub fn from_tokens(tokens: &[String]) -> Result<Self> {
        let Some((name, rest)) = tokens.split_first() else {
            return Err(Error::ArgParse("no se proporcionó ningún comando".into()));
        };
        let mut flags = Flags::parse(rest)?;

        let cmd = match name.to_lowercase().as_str() {
            "mkdisk" => Command::Mkdisk {
                size: parse_positive(&flags.require("size")?)?,
                unit: flags.take("unit")?.map(|v| parse_unit(&v)).transpose()?.unwrap_or(Unit::M),
                fit: flags.take("fit")?.map(|v| parse_fit(&v)).transpose()?.unwrap_or(Fit::First),
                path: PathBuf::from(non_empty("path", flags.require("path")?)?),
            },
            "rmdisk" => Command::Rmdisk {
                path: PathBuf::from(non_empty("path", flags.require("path")?)?),
            },
            "fdisk" => Command::Fdisk {
                size: parse_positive(&flags.require("size")?)?,
                unit: flags.take("unit")?.map(|v| parse_unit(&v)).transpose()?.unwrap_or(Unit::M),
                fit: flags.take("fit")?.map(|v| parse_fit(&v)).transpose()?.unwrap_or(Fit::Worst),
                kind: flags
                    .take("type")?
                    .map(|v| parse_part_type(&v))
                    .transpose()?
                    .unwrap_or(PartitionType::Primary),
                name: non_empty("nombre", flags.require("name")?)?,
                path: PathBuf::from(non_empty("path", flags.require("path")?)?),
            },
            "mount" => Command::Mount {
                path: PathBuf::from(non_empty("path", flags.require("path")?)?),
                name: non_empty("nombre", flags.require("name")?)?,
            },
            "mounted" => Command::Mounted,
            "mkfs" => {
                if let Some(t) = flags.take("type")? {
                    if t.to_lowercase() != "full" {
                        return Err(Error::ArgParse("el tipo debe ser full".into()));
                    }
                }
                Command::Mkfs {
                    id: non_empty("id", flags.require("id")?)?,
                    fs: flags.take("fs")?.map(|v| parse_fs(&v)).transpose()?.unwrap_or(FsKind::Ext2),
                }
            }
            "login" => Command::Login {
                user: non_empty("usuario", flags.require("user")?)?,
                pass: non_empty("pass", flags.require("pass")?)?,
                id: non_empty("id", flags.require("id")?)?,
            },
            "logout" => Command::Logout,
            "mkdir" => Command::Mkdir {
                parents: flags.take_switch("p"),
                path: non_empty("path", flags.require("path")?)?,
            },
            "mkfile" => Command::Mkfile {
                parents: flags.take_switch("r"),
                size: flags
                    .take("size")?
                    .map(|v| parse_non_negative(&v))
                    .transpose()?
                    .unwrap_or(0),
                cont: flags.take("cont")?,
                path: non_empty("path", flags.require("path")?)?,
            },
            "cat" => {
                let files = flags.take_numbered("file");
                if files.is_empty() {
                    return Err(Error::ArgParse("faltan parámetros requeridos: -file1".into()));
                }
                Command::Cat { files }
            }
            "rmusr" => Command::Rmusr {
                user: non_empty("usuario", flags.require("user")?)?,
            },
            "rep" => Command::Rep {
                id: non_empty("id", flags.require("id")?)?,
                name: parse_report(&flags.require("name")?)?,
                path: PathBuf::from(non_empty("path", flags.require("path")?)?),
                path_file_ls: flags.take("path_file_ls")?,
            },
            other => return Err(Error::ArgParse(format!("comando desconocido: {other}"))),
        };

        flags.finish()?;
        Ok(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(line: &[&str]) -> Vec<String> {
        line.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn mkdisk_defaults() {
        let cmd = Command::from_tokens(&toks(&["mkdisk", "-size=5", "-path=/tmp/d.mia"])).unwrap();
        assert_eq!(
            cmd,
            Command::Mkdisk {
                size: 5,
                unit: Unit::M,
                fit: Fit::First,
                path: PathBuf::from("/tmp/d.mia"),
            }
        );
    }

    #[test]
    fn flags_are_case_insensitive() {
        let cmd = Command::from_tokens(&toks(&[
            "FDISK", "-Size=300", "-UNIT=K", "-name=P1", "-path=/tmp/d.mia",
        ]))
        .unwrap();
        assert!(matches!(
            cmd,
            Command::Fdisk {
                size: 300,
                unit: Unit::K,
                fit: Fit::Worst,
                kind: PartitionType::Primary,
                ..
            }
        ));
    }

    #[test]
    fn quoted_values_keep_spaces() {
        let cmd = Command::from_tokens(&toks(&[
            "mkfile",
            "-r",
            "-path=/a/b.txt",
            "-cont=\"hola mundo\"",
        ]))
        .unwrap();
        assert_eq!(
            cmd,
            Command::Mkfile {
                path: "/a/b.txt".into(),
                parents: true,
                size: 0,
                cont: Some("hola mundo".into()),
            }
        );
    }

    #[test]
    fn unknown_flag_rejected() {
        let err = Command::from_tokens(&toks(&["mounted", "-x=1"])).unwrap_err();
        assert!(matches!(err, crate::Error::ArgParse(_)));
    }

    #[test]
    fn cat_collects_ordered_files() {
        let cmd = Command::from_tokens(&toks(&[
            "cat",
            "-file2=/b.txt",
            "-file1=/a.txt",
        ]))
        .unwrap();
        assert_eq!(
            cmd,
            Command::Cat {
                files: vec!["/a.txt".into(), "/b.txt".into()],
            }
        );
    }

    #[test]
    fn negative_size_rejected() {
        let err =
            Command::from_tokens(&toks(&["mkdisk", "-size=-3", "-path=/tmp/d.mia"])).unwrap_err();
        assert!(matches!(err, crate::Error::ArgParse(_)));
    }
}
