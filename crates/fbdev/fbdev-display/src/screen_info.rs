//! Kernel screen-info structs and their byte layout
//!
//! `struct fb_fix_screeninfo` and `struct fb_var_screeninfo` are described
//! once, as tables of `(field, byte offset, width)`. Both directions of the
//! codec walk the same table, so a layout fix is a one-line change.
//!
//! Values are native-endian, as the kernel writes them. The two
//! `unsigned long` members of the fixed struct follow the target's pointer
//! width, which moves every later field and the struct size (68 bytes on
//! 32-bit targets, 80 on 64-bit).

// Every value is read and written with exactly the width its table entry
// declares, so narrowing a u64 back to that width never drops set bits.
// Offsets are compile-time constants well below the struct size.
#![allow(clippy::cast_possible_truncation, clippy::arithmetic_side_effects)]

use core::fmt;

/// Length of the fixed-info identification string.
pub const ID_LEN: usize = 16;

/// Storage width of one struct member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidth {
    /// `__u16`
    U16,
    /// `__u32`
    U32,
    /// `unsigned long`
    Ulong,
    /// `char[ID_LEN]`
    Id,
}

impl FieldWidth {
    /// Bytes occupied on the current target.
    pub const fn size(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
            Self::Ulong => core::mem::size_of::<libc::c_ulong>(),
            Self::Id => ID_LEN,
        }
    }
}

/// One row of a layout table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec<F> {
    /// Which member
    pub field: F,
    /// Byte offset from the start of the struct
    pub offset: usize,
    /// Storage width
    pub width: FieldWidth,
}

const fn spec<F>(field: F, offset: usize, width: FieldWidth) -> FieldSpec<F> {
    FieldSpec { field, offset, width }
}

/// A member value in transit between a struct and its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    /// Any integer member
    Uint(u64),
    /// The identification string
    Id([u8; ID_LEN]),
}

impl FieldValue {
    fn uint(self) -> u64 {
        match self {
            Self::Uint(v) => v,
            Self::Id(_) => 0,
        }
    }

    fn u32(self) -> u32 {
        self.uint() as u32
    }

    fn u16(self) -> u16 {
        self.uint() as u16
    }
}

/// Raw bytes did not have the struct's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("screen info needs {expected} bytes, got {actual}")]
pub struct LayoutError {
    /// Native struct size
    pub expected: usize,
    /// Bytes supplied
    pub actual: usize,
}

/// A kernel struct with a table-driven byte codec.
pub trait ScreenInfo: Sized + Default {
    /// Member selector used by [`LAYOUT`](Self::LAYOUT).
    type Field: Copy + fmt::Debug + 'static;

    /// Native struct size in bytes, padding included.
    const SIZE: usize;

    /// Every member this crate reads or writes. Padding and reserved words
    /// are absent and encode as zero.
    const LAYOUT: &'static [FieldSpec<Self::Field>];

    /// Current value of `field`.
    fn get(&self, field: Self::Field) -> FieldValue;

    /// Store `value` into `field`.
    fn set(&mut self, field: Self::Field, value: FieldValue);

    /// Decode from exactly [`SIZE`](Self::SIZE) native-endian bytes.
    fn decode(bytes: &[u8]) -> Result<Self, LayoutError> {
        let mismatch = LayoutError { expected: Self::SIZE, actual: bytes.len() };
        if bytes.len() != Self::SIZE {
            return Err(mismatch);
        }
        let mut info = Self::default();
        for spec in Self::LAYOUT {
            let value = read_field(bytes, spec.offset, spec.width).ok_or(mismatch)?;
            info.set(spec.field, value);
        }
        Ok(info)
    }

    /// Encode into `out`, which must be exactly [`SIZE`](Self::SIZE) bytes.
    fn encode_into(&self, out: &mut [u8]) -> Result<(), LayoutError> {
        let mismatch = LayoutError { expected: Self::SIZE, actual: out.len() };
        if out.len() != Self::SIZE {
            return Err(mismatch);
        }
        out.fill(0);
        for spec in Self::LAYOUT {
            write_field(out, spec.offset, spec.width, self.get(spec.field)).ok_or(mismatch)?;
        }
        Ok(())
    }

    /// Encode into a fresh buffer.
    fn encode(&self) -> Vec<u8> {
        let mut out = vec![0; Self::SIZE];
        // the buffer is sized from SIZE, so this cannot mismatch
        let _ = self.encode_into(&mut out);
        out
    }
}

fn read_field(bytes: &[u8], offset: usize, width: FieldWidth) -> Option<FieldValue> {
    let raw = bytes.get(offset..offset.checked_add(width.size())?)?;
    let value = match (width, raw.len()) {
        (FieldWidth::Id, _) => return Some(FieldValue::Id(raw.try_into().ok()?)),
        (_, 2) => u64::from(u16::from_ne_bytes(raw.try_into().ok()?)),
        (_, 4) => u64::from(u32::from_ne_bytes(raw.try_into().ok()?)),
        (_, 8) => u64::from_ne_bytes(raw.try_into().ok()?),
        _ => return None,
    };
    Some(FieldValue::Uint(value))
}

fn write_field(out: &mut [u8], offset: usize, width: FieldWidth, value: FieldValue) -> Option<()> {
    let dst = out.get_mut(offset..offset.checked_add(width.size())?)?;
    match (value, dst.len()) {
        (FieldValue::Id(id), ID_LEN) => dst.copy_from_slice(&id),
        (FieldValue::Uint(v), 2) => dst.copy_from_slice(&(v as u16).to_ne_bytes()),
        (FieldValue::Uint(v), 4) => dst.copy_from_slice(&(v as u32).to_ne_bytes()),
        (FieldValue::Uint(v), 8) => dst.copy_from_slice(&v.to_ne_bytes()),
        _ => return None,
    }
    Some(())
}

// ---------------------------------------------------------------------------
// fb_fix_screeninfo
// ---------------------------------------------------------------------------

/// Members of `struct fb_fix_screeninfo`.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedField {
    Id,
    SmemStart,
    SmemLen,
    Type,
    TypeAux,
    Visual,
    XPanStep,
    YPanStep,
    YWrapStep,
    LineLength,
    MmioStart,
    MmioLen,
    Accel,
    Capabilities,
}

/// Device identity and memory region, from `FBIOGET_FSCREENINFO`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedScreenInfo {
    /// Driver identification, NUL padded
    pub id: [u8; ID_LEN],
    /// Physical start of frame-buffer memory
    pub smem_start: u64,
    /// Length of frame-buffer memory
    pub smem_len: u32,
    /// `FB_TYPE_*`
    pub fb_type: u32,
    /// Interleave for interleaved planes
    pub type_aux: u32,
    /// `FB_VISUAL_*`
    pub visual: u32,
    /// Hardware panning step, 0 if unsupported
    pub xpanstep: u16,
    /// Hardware panning step, 0 if unsupported
    pub ypanstep: u16,
    /// Hardware y-wrap step, 0 if unsupported
    pub ywrapstep: u16,
    /// Bytes per scan line
    pub line_length: u32,
    /// Physical start of memory-mapped I/O
    pub mmio_start: u64,
    /// Length of memory-mapped I/O
    pub mmio_len: u32,
    /// Accelerator type
    pub accel: u32,
    /// `FB_CAP_*`
    pub capabilities: u16,
}

impl FixedScreenInfo {
    /// Identification with trailing NUL, space and line-break characters
    /// removed.
    pub fn id_str(&self) -> String {
        String::from_utf8_lossy(&self.id)
            .trim_end_matches(['\0', ' ', '\r', '\n'])
            .to_owned()
    }

    /// Build an identification field from `name`, truncated to fit.
    pub fn id_from_str(name: &str) -> [u8; ID_LEN] {
        let mut id = [0; ID_LEN];
        for (dst, src) in id.iter_mut().zip(name.bytes()) {
            *dst = src;
        }
        id
    }
}

#[cfg(target_pointer_width = "64")]
const FIXED_LAYOUT: [FieldSpec<FixedField>; 14] = [
    spec(FixedField::Id, 0, FieldWidth::Id),
    spec(FixedField::SmemStart, 16, FieldWidth::Ulong),
    spec(FixedField::SmemLen, 24, FieldWidth::U32),
    spec(FixedField::Type, 28, FieldWidth::U32),
    spec(FixedField::TypeAux, 32, FieldWidth::U32),
    spec(FixedField::Visual, 36, FieldWidth::U32),
    spec(FixedField::XPanStep, 40, FieldWidth::U16),
    spec(FixedField::YPanStep, 42, FieldWidth::U16),
    spec(FixedField::YWrapStep, 44, FieldWidth::U16),
    spec(FixedField::LineLength, 48, FieldWidth::U32),
    spec(FixedField::MmioStart, 56, FieldWidth::Ulong),
    spec(FixedField::MmioLen, 64, FieldWidth::U32),
    spec(FixedField::Accel, 68, FieldWidth::U32),
    spec(FixedField::Capabilities, 72, FieldWidth::U16),
];

#[cfg(target_pointer_width = "64")]
const FIXED_SIZE: usize = 80;

#[cfg(target_pointer_width = "32")]
const FIXED_LAYOUT: [FieldSpec<FixedField>; 14] = [
    spec(FixedField::Id, 0, FieldWidth::Id),
    spec(FixedField::SmemStart, 16, FieldWidth::Ulong),
    spec(FixedField::SmemLen, 20, FieldWidth::U32),
    spec(FixedField::Type, 24, FieldWidth::U32),
    spec(FixedField::TypeAux, 28, FieldWidth::U32),
    spec(FixedField::Visual, 32, FieldWidth::U32),
    spec(FixedField::XPanStep, 36, FieldWidth::U16),
    spec(FixedField::YPanStep, 38, FieldWidth::U16),
    spec(FixedField::YWrapStep, 40, FieldWidth::U16),
    spec(FixedField::LineLength, 44, FieldWidth::U32),
    spec(FixedField::MmioStart, 48, FieldWidth::Ulong),
    spec(FixedField::MmioLen, 52, FieldWidth::U32),
    spec(FixedField::Accel, 56, FieldWidth::U32),
    spec(FixedField::Capabilities, 60, FieldWidth::U16),
];

#[cfg(target_pointer_width = "32")]
const FIXED_SIZE: usize = 68;

impl ScreenInfo for FixedScreenInfo {
    type Field = FixedField;
    const SIZE: usize = FIXED_SIZE;
    const LAYOUT: &'static [FieldSpec<FixedField>] = &FIXED_LAYOUT;

    fn get(&self, field: FixedField) -> FieldValue {
        use FixedField as F;
        let v = match field {
            F::Id => return FieldValue::Id(self.id),
            F::SmemStart => self.smem_start,
            F::SmemLen => self.smem_len.into(),
            F::Type => self.fb_type.into(),
            F::TypeAux => self.type_aux.into(),
            F::Visual => self.visual.into(),
            F::XPanStep => self.xpanstep.into(),
            F::YPanStep => self.ypanstep.into(),
            F::YWrapStep => self.ywrapstep.into(),
            F::LineLength => self.line_length.into(),
            F::MmioStart => self.mmio_start,
            F::MmioLen => self.mmio_len.into(),
            F::Accel => self.accel.into(),
            F::Capabilities => self.capabilities.into(),
        };
        FieldValue::Uint(v)
    }

    fn set(&mut self, field: FixedField, value: FieldValue) {
        use FixedField as F;
        match field {
            F::Id => {
                if let FieldValue::Id(id) = value {
                    self.id = id;
                }
            }
            F::SmemStart => self.smem_start = value.uint(),
            F::SmemLen => self.smem_len = value.u32(),
            F::Type => self.fb_type = value.u32(),
            F::TypeAux => self.type_aux = value.u32(),
            F::Visual => self.visual = value.u32(),
            F::XPanStep => self.xpanstep = value.u16(),
            F::YPanStep => self.ypanstep = value.u16(),
            F::YWrapStep => self.ywrapstep = value.u16(),
            F::LineLength => self.line_length = value.u32(),
            F::MmioStart => self.mmio_start = value.uint(),
            F::MmioLen => self.mmio_len = value.u32(),
            F::Accel => self.accel = value.u32(),
            F::Capabilities => self.capabilities = value.u16(),
        }
    }
}

// ---------------------------------------------------------------------------
// fb_var_screeninfo
// ---------------------------------------------------------------------------

/// Placement of one color channel inside a pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitField {
    /// Bit offset from the least significant bit
    pub offset: u32,
    /// Bits in the channel
    pub length: u32,
    /// Non-zero if the most significant bit is on the right
    pub msb_right: u32,
}

impl BitField {
    /// Channel at `offset` spanning `length` bits.
    pub const fn new(offset: u32, length: u32) -> Self {
        Self { offset, length, msb_right: 0 }
    }
}

impl fmt::Display for BitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.length, self.offset)
    }
}

/// Which channel of a pixel.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
    Transp,
}

/// Which word of a [`BitField`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitPart {
    Offset,
    Length,
    MsbRight,
}

/// Members of `struct fb_var_screeninfo`.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableField {
    Xres,
    Yres,
    XresVirtual,
    YresVirtual,
    Xoffset,
    Yoffset,
    BitsPerPixel,
    Grayscale,
    Channel(Channel, BitPart),
    Nonstd,
    Activate,
    Height,
    Width,
    AccelFlags,
    Pixclock,
    LeftMargin,
    RightMargin,
    UpperMargin,
    LowerMargin,
    HsyncLen,
    VsyncLen,
    Sync,
    Vmode,
    Rotate,
    Colorspace,
}

/// Resolution, depth and channel layout, from `FBIOGET_VSCREENINFO`.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariableScreenInfo {
    /// Visible resolution
    pub xres: u32,
    pub yres: u32,
    /// Virtual resolution
    pub xres_virtual: u32,
    pub yres_virtual: u32,
    /// Offset from virtual to visible
    pub xoffset: u32,
    pub yoffset: u32,
    pub bits_per_pixel: u32,
    /// 0 = color, 1 = grayscale, >1 = FOURCC
    pub grayscale: u32,
    pub red: BitField,
    pub green: BitField,
    pub blue: BitField,
    pub transp: BitField,
    /// Non-zero for non-standard pixel formats
    pub nonstd: u32,
    pub activate: u32,
    /// Picture size in millimetres
    pub height: u32,
    pub width: u32,
    pub accel_flags: u32,
    /// Timing, all in pixclocks except `pixclock` itself (picoseconds)
    pub pixclock: u32,
    pub left_margin: u32,
    pub right_margin: u32,
    pub upper_margin: u32,
    pub lower_margin: u32,
    pub hsync_len: u32,
    pub vsync_len: u32,
    pub sync: u32,
    pub vmode: u32,
    /// Angle rotated counter-clockwise
    pub rotate: u32,
    pub colorspace: u32,
}

impl VariableScreenInfo {
    /// A truecolor mode with the usual channel placement for `bits_per_pixel`.
    pub fn truecolor(xres: u32, yres: u32, bits_per_pixel: u32) -> Self {
        let (red, green, blue, transp) = match bits_per_pixel {
            16 => (BitField::new(11, 5), BitField::new(5, 6), BitField::new(0, 5), BitField::default()),
            24 => (BitField::new(0, 8), BitField::new(8, 8), BitField::new(16, 8), BitField::default()),
            32 => (BitField::new(0, 8), BitField::new(8, 8), BitField::new(16, 8), BitField::new(24, 8)),
            _ => Default::default(),
        };
        Self {
            xres,
            yres,
            xres_virtual: xres,
            yres_virtual: yres,
            bits_per_pixel,
            red,
            green,
            blue,
            transp,
            ..Self::default()
        }
    }

    fn channel(&self, channel: Channel) -> &BitField {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
            Channel::Transp => &self.transp,
        }
    }

    fn channel_mut(&mut self, channel: Channel) -> &mut BitField {
        match channel {
            Channel::Red => &mut self.red,
            Channel::Green => &mut self.green,
            Channel::Blue => &mut self.blue,
            Channel::Transp => &mut self.transp,
        }
    }
}

const fn channel(c: Channel, base: usize) -> [FieldSpec<VariableField>; 3] {
    [
        spec(VariableField::Channel(c, BitPart::Offset), base, FieldWidth::U32),
        spec(VariableField::Channel(c, BitPart::Length), base + 4, FieldWidth::U32),
        spec(VariableField::Channel(c, BitPart::MsbRight), base + 8, FieldWidth::U32),
    ]
}

const RED: [FieldSpec<VariableField>; 3] = channel(Channel::Red, 32);
const GREEN: [FieldSpec<VariableField>; 3] = channel(Channel::Green, 44);
const BLUE: [FieldSpec<VariableField>; 3] = channel(Channel::Blue, 56);
const TRANSP: [FieldSpec<VariableField>; 3] = channel(Channel::Transp, 68);

// Four trailing reserved words (144..160) are not listed.
const VARIABLE_LAYOUT: [FieldSpec<VariableField>; 36] = {
    use FieldWidth::U32;
    use VariableField as V;
    [
        spec(V::Xres, 0, U32),
        spec(V::Yres, 4, U32),
        spec(V::XresVirtual, 8, U32),
        spec(V::YresVirtual, 12, U32),
        spec(V::Xoffset, 16, U32),
        spec(V::Yoffset, 20, U32),
        spec(V::BitsPerPixel, 24, U32),
        spec(V::Grayscale, 28, U32),
        RED[0],
        RED[1],
        RED[2],
        GREEN[0],
        GREEN[1],
        GREEN[2],
        BLUE[0],
        BLUE[1],
        BLUE[2],
        TRANSP[0],
        TRANSP[1],
        TRANSP[2],
        spec(V::Nonstd, 80, U32),
        spec(V::Activate, 84, U32),
        spec(V::Height, 88, U32),
        spec(V::Width, 92, U32),
        spec(V::AccelFlags, 96, U32),
        spec(V::Pixclock, 100, U32),
        spec(V::LeftMargin, 104, U32),
        spec(V::RightMargin, 108, U32),
        spec(V::UpperMargin, 112, U32),
        spec(V::LowerMargin, 116, U32),
        spec(V::HsyncLen, 120, U32),
        spec(V::VsyncLen, 124, U32),
        spec(V::Sync, 128, U32),
        spec(V::Vmode, 132, U32),
        spec(V::Rotate, 136, U32),
        spec(V::Colorspace, 140, U32),
    ]
};

impl ScreenInfo for VariableScreenInfo {
    type Field = VariableField;
    const SIZE: usize = 160;
    const LAYOUT: &'static [FieldSpec<VariableField>] = &VARIABLE_LAYOUT;

    fn get(&self, field: VariableField) -> FieldValue {
        use VariableField as V;
        let v = match field {
            V::Xres => self.xres,
            V::Yres => self.yres,
            V::XresVirtual => self.xres_virtual,
            V::YresVirtual => self.yres_virtual,
            V::Xoffset => self.xoffset,
            V::Yoffset => self.yoffset,
            V::BitsPerPixel => self.bits_per_pixel,
            V::Grayscale => self.grayscale,
            V::Channel(c, BitPart::Offset) => self.channel(c).offset,
            V::Channel(c, BitPart::Length) => self.channel(c).length,
            V::Channel(c, BitPart::MsbRight) => self.channel(c).msb_right,
            V::Nonstd => self.nonstd,
            V::Activate => self.activate,
            V::Height => self.height,
            V::Width => self.width,
            V::AccelFlags => self.accel_flags,
            V::Pixclock => self.pixclock,
            V::LeftMargin => self.left_margin,
            V::RightMargin => self.right_margin,
            V::UpperMargin => self.upper_margin,
            V::LowerMargin => self.lower_margin,
            V::HsyncLen => self.hsync_len,
            V::VsyncLen => self.vsync_len,
            V::Sync => self.sync,
            V::Vmode => self.vmode,
            V::Rotate => self.rotate,
            V::Colorspace => self.colorspace,
        };
        FieldValue::Uint(v.into())
    }

    fn set(&mut self, field: VariableField, value: FieldValue) {
        use VariableField as V;
        let v = value.u32();
        let slot = match field {
            V::Xres => &mut self.xres,
            V::Yres => &mut self.yres,
            V::XresVirtual => &mut self.xres_virtual,
            V::YresVirtual => &mut self.yres_virtual,
            V::Xoffset => &mut self.xoffset,
            V::Yoffset => &mut self.yoffset,
            V::BitsPerPixel => &mut self.bits_per_pixel,
            V::Grayscale => &mut self.grayscale,
            V::Channel(c, BitPart::Offset) => &mut self.channel_mut(c).offset,
            V::Channel(c, BitPart::Length) => &mut self.channel_mut(c).length,
            V::Channel(c, BitPart::MsbRight) => &mut self.channel_mut(c).msb_right,
            V::Nonstd => &mut self.nonstd,
            V::Activate => &mut self.activate,
            V::Height => &mut self.height,
            V::Width => &mut self.width,
            V::AccelFlags => &mut self.accel_flags,
            V::Pixclock => &mut self.pixclock,
            V::LeftMargin => &mut self.left_margin,
            V::RightMargin => &mut self.right_margin,
            V::UpperMargin => &mut self.upper_margin,
            V::LowerMargin => &mut self.lower_margin,
            V::HsyncLen => &mut self.hsync_len,
            V::VsyncLen => &mut self.vsync_len,
            V::Sync => &mut self.sync,
            V::Vmode => &mut self.vmode,
            V::Rotate => &mut self.rotate,
            V::Colorspace => &mut self.colorspace,
        };
        *slot = v;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    fn assert_layout_sane<S: ScreenInfo>() {
        let mut end = 0;
        for spec in S::LAYOUT {
            assert!(spec.offset >= end, "{:?} overlaps the previous member", spec.field);
            end = spec.offset + spec.width.size();
        }
        assert!(end <= S::SIZE);
    }

    #[test]
    fn test_layouts_are_ordered_and_fit() {
        assert_layout_sane::<FixedScreenInfo>();
        assert_layout_sane::<VariableScreenInfo>();
        assert_eq!(FixedScreenInfo::SIZE % core::mem::align_of::<libc::c_ulong>(), 0);
    }

    #[test]
    fn test_fixed_size_tracks_pointer_width() {
        let expected = if cfg!(target_pointer_width = "64") { 80 } else { 68 };
        assert_eq!(FixedScreenInfo::SIZE, expected);
    }

    #[test]
    fn test_variable_offsets_match_kernel_header() {
        let info = VariableScreenInfo {
            xres: 800,
            yres: 480,
            bits_per_pixel: 16,
            red: BitField::new(11, 5),
            transp: BitField { offset: 24, length: 8, msb_right: 1 },
            colorspace: 7,
            ..Default::default()
        };
        let bytes = info.encode();
        let word = |at: usize| u32::from_ne_bytes(bytes[at..at + 4].try_into().unwrap());
        assert_eq!(bytes.len(), 160);
        assert_eq!(word(0), 800);
        assert_eq!(word(4), 480);
        assert_eq!(word(24), 16);
        assert_eq!(word(32), 11);
        assert_eq!(word(36), 5);
        assert_eq!(word(68), 24);
        assert_eq!(word(72), 8);
        assert_eq!(word(76), 1);
        assert_eq!(word(140), 7);
        assert!(bytes[144..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_variable_decode_reads_every_member() {
        let mut info = VariableScreenInfo::truecolor(1920, 1080, 32);
        info.pixclock = 6734;
        info.rotate = 3;
        info.green.msb_right = 1;
        assert_eq!(VariableScreenInfo::decode(&info.encode()).unwrap(), info);
    }

    #[test]
    fn test_fixed_decode_by_hand() {
        let mut raw = vec![0u8; FixedScreenInfo::SIZE];
        raw[..7].copy_from_slice(b"mxsfb\n\0");
        let smem_len_at = if cfg!(target_pointer_width = "64") { 24 } else { 20 };
        raw[smem_len_at..smem_len_at + 4].copy_from_slice(&614_400u32.to_ne_bytes());
        let info = FixedScreenInfo::decode(&raw).unwrap();
        assert_eq!(info.id_str(), "mxsfb");
        assert_eq!(info.smem_len, 614_400);
        assert_eq!(info.smem_start, 0);
    }

    #[test]
    fn test_fixed_encode_places_ulong_members() {
        let info = FixedScreenInfo {
            id: FixedScreenInfo::id_from_str("simple"),
            smem_start: 0x1234_5678,
            line_length: 1600,
            mmio_start: 0x0bad_f00d,
            capabilities: 0x0001,
            ..Default::default()
        };
        let bytes = info.encode();
        let (start, line, mmio, caps) =
            if cfg!(target_pointer_width = "64") { (16, 48, 56, 72) } else { (16, 44, 48, 60) };
        let u32_at = |at: usize| u32::from_ne_bytes(bytes[at..at + 4].try_into().unwrap());
        assert_eq!(&bytes[..6], b"simple");
        let ulong = FieldWidth::Ulong.size();
        assert_eq!(&bytes[start..start + ulong], &(0x1234_5678 as libc::c_ulong).to_ne_bytes()[..]);
        assert_eq!(u32_at(line), 1600);
        assert_eq!(u32_at(mmio), 0x0bad_f00d);
        assert_eq!(u16::from_ne_bytes([bytes[caps], bytes[caps + 1]]), 1);
        assert_eq!(FixedScreenInfo::decode(&bytes).unwrap(), info);
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        assert_eq!(
            VariableScreenInfo::decode(&[0; 159]),
            Err(LayoutError { expected: 160, actual: 159 })
        );
        let mut short = [0u8; 10];
        assert!(FixedScreenInfo::default().encode_into(&mut short).is_err());
    }

    #[test]
    fn test_id_trimming_and_truncation() {
        let info = FixedScreenInfo { id: *b"BCM2708 FB \r\n\0\0\0", ..Default::default() };
        assert_eq!(info.id_str(), "BCM2708 FB");
        assert_eq!(&FixedScreenInfo::id_from_str("a-very-long-driver-name"), b"a-very-long-driv");
    }

    #[test]
    fn test_bitfield_display() {
        assert_eq!(BitField::new(11, 5).to_string(), "5/11");
    }
}
