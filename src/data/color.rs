//! Colors and the id-color codec used for picking.
//!
//! Pickable things are drawn a second time into an auxiliary render target where each one is
//! filled with a color that encodes its id. Reading one pixel back and decoding it tells which
//! thing is under the pointer. Ids are 24 bits wide, one byte per color channel, little-endian:
//! red holds the lowest byte.

use cgmath::Vector3;

/// Number of distinct ids the codec can represent.
pub const ID_COUNT: u32 = 1 << 24;

/// The id of the background, i.e. nothing picked.
pub const NO_ID: u32 = 0;

/// Encodes an id as an RGB byte triple. Bits above the lowest 24 are ignored.
pub fn id_to_color(id: u32) -> [u8; 3] {
    [
        (id & 0xFF) as u8,
        ((id >> 8) & 0xFF) as u8,
        ((id >> 16) & 0xFF) as u8,
    ]
}

/// Decodes an RGB byte triple read back from a picking target.
pub fn color_to_id(color: [u8; 3]) -> u32 {
    color[0] as u32 + ((color[1] as u32) << 8) + ((color[2] as u32) << 16)
}

/// Encodes an id as normalized floats, the form shaders and vertex attributes want.
pub fn id_to_color_f32(id: u32) -> [f32; 3] {
    Color::from(id_to_color(id)).into()
}

/// A linear RGB color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Black, which is also the picking background.
    pub const BLACK: Color = Color {
        r: 0.,
        g: 0.,
        b: 0.,
    };

    /// White.
    pub const WHITE: Color = Color {
        r: 1.,
        g: 1.,
        b: 1.,
    };

    /// Quantizes this color to bytes, the way a fixed-point render target stores it.
    pub fn to_bytes(self) -> [u8; 3] {
        fn quantize(c: f32) -> u8 {
            (c.max(0.).min(1.) * 255.).round() as u8
        }
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }
}

impl From<[u8; 3]> for Color {
    fn from(i: [u8; 3]) -> Color {
        Color {
            r: i[0] as f32 / 255.,
            g: i[1] as f32 / 255.,
            b: i[2] as f32 / 255.,
        }
    }
}

impl From<[f32; 3]> for Color {
    fn from(i: [f32; 3]) -> Color {
        Color {
            r: i[0],
            g: i[1],
            b: i[2],
        }
    }
}

impl Into<[f32; 3]> for Color {
    fn into(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Into<Vector3<f32>> for Color {
    fn into(self) -> Vector3<f32> {
        Vector3 {
            x: self.r,
            y: self.g,
            z: self.b,
        }
    }
}

#[test]
fn codec_round_trip() {
    // every 24-bit id survives encoding and decoding
    for id in 0..ID_COUNT {
        assert_eq!(color_to_id(id_to_color(id)), id);
    }
}

#[test]
fn codec_byte_order() {
    assert_eq!(id_to_color(NO_ID), [0, 0, 0]);
    assert_eq!(id_to_color(1), [1, 0, 0]);
    assert_eq!(id_to_color(0x01_02_03), [3, 2, 1]);
    assert_eq!(id_to_color(0xFF_FF_FF), [255, 255, 255]);
    assert_eq!(id_to_color(ID_COUNT + 5), id_to_color(5));
    assert_eq!(color_to_id([0, 1, 0]), 256);
    assert_eq!(color_to_id([0, 0, 1]), 65536);
}

#[test]
fn float_colors_quantize_back_to_ids() {
    for &id in &[1, 2, 255, 256, 4097, 0xAB_CD_EF] {
        let color = Color::from(id_to_color_f32(id));
        assert_eq!(color_to_id(color.to_bytes()), id);
    }
    assert_eq!(id_to_color_f32(255), [1., 0., 0.]);
}
