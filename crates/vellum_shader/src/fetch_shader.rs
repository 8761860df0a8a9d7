//! Fetch Shader Parser
//!
//! GCN vertex shaders do not receive attributes directly. They call a small
//! driver-generated *fetch shader* that loads each attribute from its vertex
//! buffer into VGPRs and returns:
//!
//! ```text
//! s_load_dwordx4   s[8:11], s[2:3], 0x00     ; V# for attribute 0
//! s_load_dwordx4   s[12:15], s[2:3], 0x04    ; V# for attribute 1
//! v_add_i32        v4, vcc, s0, v0           ; vertex index + base vertex
//! s_waitcnt        lgkmcnt(0)
//! buffer_load_format_xyzw v[8:11], v4, s[8:11], 0 idxen
//! buffer_load_format_xy   v[12:13], v4, s[12:15], 0 idxen
//! s_setpc_b64      s[0:1]
//! ```
//!
//! The parser recovers the attribute table from that code: which VGPRs each
//! attribute lands in, how many components it has, and where its V# comes from.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use vellum_gpu::Buffer;

use crate::errors::{Result, ShaderError};
use crate::info::ShaderInfo;
use crate::resources::ResolveSharp;
use crate::user_data::UserData;

/// Index the attribute advances with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputStep {
    #[default]
    Vertex,
    Instance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VertexAttribute {
    /// Position in the fetch order.
    pub semantic: u8,
    /// First VGPR written by the load.
    pub dest_vgpr: u8,
    pub num_elements: u8,
    /// SGPR pair holding the pointer to the V# table.
    pub sgpr_base: u8,
    /// Offset of the V# in the table, in dwords.
    pub dword_offset: u8,
    pub step: InputStep,
}

impl ResolveSharp for VertexAttribute {
    type Sharp = Buffer;

    fn get_sharp(&self, ud: &UserData) -> Option<Buffer> {
        let dw = ud.read_indirect::<{ Buffer::DWORDS }>(
            usize::from(self.sgpr_base),
            usize::from(self.dword_offset),
        )?;
        let buffer = Buffer::from_dwords(dw);
        buffer.is_valid().then_some(buffer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FetchShaderData {
    pub attributes: SmallVec<[VertexAttribute; 16]>,
    /// SGPR added to the vertex index (base vertex), if any.
    pub vertex_offset_sgpr: Option<u8>,
    /// SGPR added to the instance index (base instance), if any.
    pub instance_offset_sgpr: Option<u8>,
}

/// Parses the fetch shader called by `info`, if it has one.
///
/// Code that fails to decode is reported and treated as absent: the stage then
/// specializes as if it had no fetch shader.
#[must_use]
pub fn parse_fetch_shader(info: &ShaderInfo) -> Option<FetchShaderData> {
    let code = info.fetch_shader.as_deref()?;
    match FetchShaderData::parse(code) {
        Ok(data) => Some(data),
        Err(err) => {
            log::warn!("Shader {:#018x}: {err}", info.pgm_hash);
            None
        }
    }
}

// ─── Encodings ────────────────────────────────────────────────────────────────

const SGPR_LIMIT: u32 = 104;
const LITERAL_CONST: u32 = 255;

/// VGPR holding the vertex index on entry.
const VERTEX_INDEX_VGPR: u32 = 0;
/// VGPR holding the instance index on entry.
const INSTANCE_INDEX_VGPR: u32 = 3;

mod op {
    pub const S_NOP: u32 = 0x00;
    pub const S_WAITCNT: u32 = 0x0C;
    pub const S_SETPC_B64: u32 = 0x20;
    pub const S_LOAD_DWORD: u32 = 0x00;
    pub const S_LOAD_DWORDX2: u32 = 0x01;
    pub const S_LOAD_DWORDX4: u32 = 0x02;
    pub const S_LOAD_DWORDX16: u32 = 0x04;
    pub const V_ADD_I32: u32 = 0x25;
    pub const LOAD_FORMAT_XYZW: u32 = 0x03;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Sopp,
    Sop1,
    Smrd,
    Vop1,
    Vop2,
    Vop3,
    Mubuf,
    Mtbuf,
}

fn classify(word: u32) -> Option<Encoding> {
    if word >> 31 == 0 {
        return Some(match word >> 25 {
            0x3F => Encoding::Vop1,
            0x3E => return None, // VOPC
            _ => Encoding::Vop2,
        });
    }
    match word >> 23 {
        0x17F => return Some(Encoding::Sopp),
        0x17D => return Some(Encoding::Sop1),
        _ => {}
    }
    if word >> 27 == 0x18 {
        return Some(Encoding::Smrd);
    }
    match word >> 26 {
        0x34 => Some(Encoding::Vop3),
        0x38 => Some(Encoding::Mubuf),
        0x3A => Some(Encoding::Mtbuf),
        _ => None,
    }
}

struct Cursor<'a> {
    code: &'a [u32],
    pc: usize,
}

impl Cursor<'_> {
    fn fetch(&mut self) -> Option<u32> {
        let word = self.code.get(self.pc).copied();
        self.pc += 1;
        word
    }

    fn extra_dword(&mut self, at: usize) -> Result<u32> {
        self.fetch().ok_or(ShaderError::Truncated { pc: at })
    }
}

// ─── Parser ───────────────────────────────────────────────────────────────────

impl FetchShaderData {
    /// Decodes fetch-shader dwords up to and including the `s_setpc_b64` return.
    pub fn parse(code: &[u32]) -> Result<Self> {
        let mut data = Self::default();
        let mut cursor = Cursor { code, pc: 0 };
        // First SGPR of a loaded quad -> (pointer SGPR pair, dword offset).
        let mut vsharps: FxHashMap<u32, (u8, u8)> = FxHashMap::default();
        let mut instance_vgprs: SmallVec<[u32; 4]> = SmallVec::from_slice(&[INSTANCE_INDEX_VGPR]);

        loop {
            let pc = cursor.pc;
            let word = cursor.fetch().ok_or(ShaderError::MissingTerminator)?;
            let encoding = classify(word).ok_or(ShaderError::UnknownEncoding { pc, word })?;

            match encoding {
                Encoding::Sopp => {
                    let opcode = (word >> 16) & 0x7F;
                    if opcode != op::S_NOP && opcode != op::S_WAITCNT {
                        return Err(ShaderError::UnsupportedOpcode { pc, op: opcode });
                    }
                }
                Encoding::Sop1 => {
                    if (word >> 8) & 0xFF == op::S_SETPC_B64 {
                        return Ok(data);
                    }
                    if word & 0xFF == LITERAL_CONST {
                        cursor.extra_dword(pc)?;
                    }
                }
                Encoding::Smrd => {
                    let opcode = (word >> 22) & 0x1F;
                    let sdst = (word >> 15) & 0x7F;
                    let sbase = ((word >> 9) & 0x3F) * 2;
                    let imm = (word >> 8) & 1 != 0;
                    let offset = word & 0xFF;

                    match opcode {
                        op::S_LOAD_DWORD | op::S_LOAD_DWORDX2 => {}
                        op::S_LOAD_DWORDX4..=op::S_LOAD_DWORDX16 if imm => {
                            let num_sharps = 1u32 << (opcode - op::S_LOAD_DWORDX4);
                            for i in 0..num_sharps {
                                let table_offset = offset + i * 4;
                                let dword_offset = u8::try_from(table_offset).map_err(|_| {
                                    ShaderError::SharpOffsetOutOfRange { pc, offset: table_offset }
                                })?;
                                vsharps.insert(sdst + i * 4, (sbase as u8, dword_offset));
                            }
                        }
                        _ => return Err(ShaderError::UnsupportedOpcode { pc, op: opcode }),
                    }
                }
                Encoding::Vop1 => {
                    if word & 0x1FF == LITERAL_CONST {
                        cursor.extra_dword(pc)?;
                    }
                }
                Encoding::Vop2 => {
                    let src0 = word & 0x1FF;
                    let vsrc1 = (word >> 9) & 0xFF;
                    let vdst = (word >> 17) & 0xFF;
                    let opcode = (word >> 25) & 0x3F;

                    if src0 == LITERAL_CONST {
                        cursor.extra_dword(pc)?;
                    }
                    if opcode == op::V_ADD_I32 && src0 < SGPR_LIMIT {
                        if vsrc1 == VERTEX_INDEX_VGPR {
                            data.vertex_offset_sgpr = Some(src0 as u8);
                        } else if instance_vgprs.contains(&vsrc1) {
                            data.instance_offset_sgpr = Some(src0 as u8);
                            instance_vgprs.push(vdst);
                        }
                    }
                }
                Encoding::Vop3 => {
                    cursor.extra_dword(pc)?;
                }
                Encoding::Mubuf | Encoding::Mtbuf => {
                    let opcode = if encoding == Encoding::Mubuf {
                        (word >> 18) & 0x7F
                    } else {
                        (word >> 16) & 0x7
                    };
                    let word1 = cursor.extra_dword(pc)?;
                    if opcode > op::LOAD_FORMAT_XYZW {
                        return Err(ShaderError::UnsupportedOpcode { pc, op: opcode });
                    }

                    let vaddr = word1 & 0xFF;
                    let vdata = (word1 >> 8) & 0xFF;
                    let srsrc = ((word1 >> 16) & 0x1F) * 4;
                    let &(sgpr_base, dword_offset) = vsharps
                        .get(&srsrc)
                        .ok_or(ShaderError::UnboundVsharp { pc, sgpr: srsrc })?;

                    let step = if instance_vgprs.contains(&vaddr) {
                        InputStep::Instance
                    } else {
                        InputStep::Vertex
                    };

                    data.attributes.push(VertexAttribute {
                        semantic: data.attributes.len() as u8,
                        dest_vgpr: vdata as u8,
                        num_elements: (opcode + 1) as u8,
                        sgpr_base,
                        dword_offset,
                        step,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S_SETPC_S0: u32 = 0xBE80_2000;
    const S_WAITCNT_0: u32 = 0xBF8C_0000;

    fn s_load_dwordx4(sdst: u32, sbase: u32, offset: u32) -> u32 {
        (0x18 << 27) | (op::S_LOAD_DWORDX4 << 22) | (sdst << 15) | ((sbase / 2) << 9) | (1 << 8) | offset
    }

    fn s_load_dwordx16(sdst: u32, sbase: u32, offset: u32) -> u32 {
        (0x18 << 27) | (op::S_LOAD_DWORDX16 << 22) | (sdst << 15) | ((sbase / 2) << 9) | (1 << 8) | offset
    }

    fn buffer_load_format(op: u32, vdata: u32, vaddr: u32, srsrc: u32) -> [u32; 2] {
        [(0x38 << 26) | (op << 18) | (1 << 13), vaddr | (vdata << 8) | ((srsrc / 4) << 16)]
    }

    #[test]
    fn test_parse_minimal_fetch_shader() {
        let load = buffer_load_format(3, 8, 0, 8);
        let code = [s_load_dwordx4(8, 2, 0), S_WAITCNT_0, load[0], load[1], S_SETPC_S0];

        let data = FetchShaderData::parse(&code).expect("valid fetch shader");
        assert_eq!(data.attributes.len(), 1);
        let attr = data.attributes[0];
        assert_eq!(attr.dest_vgpr, 8);
        assert_eq!(attr.num_elements, 4);
        assert_eq!(attr.sgpr_base, 2);
        assert_eq!(attr.dword_offset, 0);
        assert_eq!(attr.step, InputStep::Vertex);
    }

    #[test]
    fn test_missing_terminator() {
        let code = [s_load_dwordx4(8, 2, 0), S_WAITCNT_0];
        assert!(matches!(
            FetchShaderData::parse(&code),
            Err(ShaderError::MissingTerminator)
        ));
    }

    #[test]
    fn test_load_through_unloaded_sharp() {
        let load = buffer_load_format(0, 4, 0, 12);
        let code = [load[0], load[1], S_SETPC_S0];
        assert!(matches!(
            FetchShaderData::parse(&code),
            Err(ShaderError::UnboundVsharp { pc: 0, sgpr: 12 })
        ));
    }

    #[test]
    fn test_truncated_memory_instruction() {
        let load = buffer_load_format(0, 4, 0, 8);
        let code = [s_load_dwordx4(8, 2, 0), load[0]];
        assert!(matches!(
            FetchShaderData::parse(&code),
            Err(ShaderError::Truncated { pc: 1 })
        ));
    }

    #[test]
    fn test_sharp_offset_past_table() {
        let load = buffer_load_format(0, 4, 0, 8);
        let code = [s_load_dwordx16(8, 2, 0xFC), load[0], load[1], S_SETPC_S0];
        assert!(matches!(
            FetchShaderData::parse(&code),
            Err(ShaderError::SharpOffsetOutOfRange { pc: 0, offset: 0x100 })
        ));
    }

    #[test]
    fn test_sharp_offset_at_table_end() {
        let load = buffer_load_format(0, 4, 0, 8);
        let code = [s_load_dwordx4(8, 2, 0xFC), load[0], load[1], S_SETPC_S0];
        let data = FetchShaderData::parse(&code).expect("valid fetch shader");
        assert_eq!(data.attributes[0].dword_offset, 0xFC);
    }
}
