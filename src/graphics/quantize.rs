//! Colour quantization for designs with too many colours
//!
//! The encoder calls a [`Quantizer`] once when the palette overflows, then
//! rebuilds the palette. Fully transparent pixels are never merged with
//! visible colours.

use std::collections::HashMap;

use image::Rgba;

use crate::formats::colour::Colour;
use crate::PixelBuffer;

/// Reduces the combined colour count of a set of buffers
pub trait Quantizer {
    /// Rewrites `buffers` in place so that together they use at most
    /// `max_colours` visible colours. Pure transparent is not counted.
    fn quantize(&self, buffers: &mut [PixelBuffer], max_colours: usize);
}

/// Median-cut quantizer over RGBA, weighted by pixel count
#[derive(Debug, Clone, Copy, Default)]
pub struct MedianCut;

impl Quantizer for MedianCut {
    fn quantize(&self, buffers: &mut [PixelBuffer], max_colours: usize) {
        // Hidden RGB under alpha 0 collapses onto the fixed transparent entry
        let mut histogram: HashMap<Colour, u32> = HashMap::new();
        for buffer in buffers.iter_mut() {
            for pixel in buffer.pixels_mut() {
                if pixel.0[3] == 0 {
                    *pixel = Rgba([0, 0, 0, 0]);
                } else {
                    *histogram.entry(Colour::from(&*pixel)).or_insert(0) += 1;
                }
            }
        }

        let target = max_colours.max(1);
        if histogram.len() <= target {
            return;
        }

        let mut colours: Vec<([u8; 4], u32)> = histogram
            .into_iter()
            .map(|(colour, count)| (colour.to_bytes(), count))
            .collect();
        // HashMap order is random; keep the result deterministic
        colours.sort_unstable();

        let palette = median_cut(colours, target);

        let mut nearest: HashMap<[u8; 4], [u8; 4]> = HashMap::new();
        for buffer in buffers.iter_mut() {
            for pixel in buffer.pixels_mut() {
                if pixel.0[3] == 0 {
                    continue;
                }
                let key = pixel.0;
                let mapped = *nearest
                    .entry(key)
                    .or_insert_with(|| nearest_colour(key, &palette));
                *pixel = Rgba(mapped);
            }
        }
    }
}

struct ColourBox {
    colours: Vec<([u8; 4], u32)>,
}

impl ColourBox {
    fn channel_range(&self, channel: usize) -> u8 {
        let (min, max) = self
            .colours
            .iter()
            .fold((u8::MAX, u8::MIN), |(lo, hi), (c, _)| (lo.min(c[channel]), hi.max(c[channel])));
        max.saturating_sub(min)
    }

    /// Widest channel and its range
    fn widest(&self) -> (usize, u8) {
        (0..4)
            .map(|ch| (ch, self.channel_range(ch)))
            .max_by_key(|&(ch, range)| (range, std::cmp::Reverse(ch)))
            .unwrap_or((0, 0))
    }

    fn can_split(&self) -> bool {
        self.colours.len() > 1
    }

    fn split(mut self) -> (ColourBox, ColourBox) {
        let (channel, _) = self.widest();
        self.colours.sort_by_key(|(c, _)| c[channel]);

        let total: u64 = self.colours.iter().map(|(_, n)| *n as u64).sum();
        let mut running = 0u64;
        let mut cut = self.colours.len() / 2;
        for (i, (_, n)) in self.colours.iter().enumerate() {
            running += *n as u64;
            if running * 2 >= total {
                cut = i + 1;
                break;
            }
        }
        // Both halves must keep at least one colour
        let cut = cut.clamp(1, self.colours.len() - 1);

        let right = self.colours.split_off(cut);
        (ColourBox { colours: self.colours }, ColourBox { colours: right })
    }

    fn average(&self) -> [u8; 4] {
        let mut sums = [0u64; 4];
        let mut total = 0u64;
        for (c, n) in &self.colours {
            for (sum, channel) in sums.iter_mut().zip(c) {
                *sum += *channel as u64 * *n as u64;
            }
            total += *n as u64;
        }
        if total == 0 {
            return [0, 0, 0, 255];
        }
        sums.map(|s| ((s + total / 2) / total) as u8)
    }
}

fn median_cut(colours: Vec<([u8; 4], u32)>, max_colours: usize) -> Vec<[u8; 4]> {
    let mut boxes = vec![ColourBox { colours }];

    while boxes.len() < max_colours {
        let candidate = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.can_split())
            .max_by_key(|(_, b)| b.widest().1)
            .map(|(i, _)| i);
        let Some(idx) = candidate else {
            break;
        };
        let (left, right) = boxes.remove(idx).split();
        boxes.push(left);
        boxes.push(right);
    }

    let mut palette: Vec<[u8; 4]> = boxes.iter().map(ColourBox::average).collect();
    palette.dedup();
    palette
}

fn nearest_colour(colour: [u8; 4], palette: &[[u8; 4]]) -> [u8; 4] {
    palette
        .iter()
        .min_by_key(|p| {
            p.iter()
                .zip(colour.iter())
                .map(|(&a, &b)| {
                    let d = a as i32 - b as i32;
                    (d * d) as u32
                })
                .sum::<u32>()
        })
        .copied()
        .unwrap_or(colour)
}
