mod common;

use common::{FrameParams, StreamBuilder};
use framecount::scanner::{count_frames, scan, SliceSource};
use proptest::prelude::*;

/// Delivers `data` split at the given points.
struct SplitSource<'a> {
    pieces: Vec<&'a [u8]>,
    next: usize,
    cancelled: usize,
}

impl<'a> SplitSource<'a> {
    fn new(data: &'a [u8], mut cuts: Vec<usize>) -> Self {
        cuts.iter_mut().for_each(|c| *c %= data.len() + 1);
        cuts.sort_unstable();
        cuts.dedup();

        let mut pieces = Vec::new();
        let mut start = 0;
        for cut in cuts.into_iter().chain(std::iter::once(data.len())) {
            pieces.push(&data[start..cut]);
            start = cut;
        }
        SplitSource {
            pieces,
            next: 0,
            cancelled: 0,
        }
    }
}

impl framecount::ChunkSource for SplitSource<'_> {
    fn next_chunk(&mut self) -> std::io::Result<Option<&[u8]>> {
        let piece = self.pieces.get(self.next).copied();
        self.next += 1;
        Ok(piece)
    }

    fn cancel(&mut self) {
        self.cancelled += 1;
    }
}

fn frame_params() -> impl Strategy<Value = FrameParams> {
    (1u8..15, 0u8..3, any::<bool>(), any::<bool>()).prop_map(
        |(bitrate_index, sample_rate_index, padding, mono)| FrameParams {
            bitrate_index,
            sample_rate_index,
            padding,
            mono,
        },
    )
}

#[test]
fn test_single_byte_chunks_match_single_chunk() {
    let spec = FrameParams::default();
    let data = StreamBuilder::new()
        .id3(777)
        .marker(spec, b"Info")
        .frames(spec, 60)
        .bytes(b"trailing junk")
        .build();

    let whole = scan(SliceSource::new(&data, data.len())).expect("single chunk");
    let bytewise = scan(SliceSource::new(&data, 1)).expect("one byte at a time");
    assert_eq!(whole, bytewise);
    assert_eq!(whole.frame_count, 60);
}

#[test]
fn test_cancel_called_once() {
    let data = StreamBuilder::new().frames(FrameParams::default(), 5).build();
    let mut source = SplitSource::new(&data, vec![10, 500, 1200]);
    assert_eq!(count_frames(&mut source).expect("valid stream"), 5);
    assert_eq!(source.cancelled, 1);
}

proptest! {
    #[test]
    fn prop_chunk_boundaries_do_not_matter(
        spec in frame_params(),
        frames in 1usize..40,
        tag in prop::option::of(0usize..600),
        marker in any::<bool>(),
        cuts in prop::collection::vec(any::<usize>(), 0..30),
    ) {
        let mut builder = StreamBuilder::new();
        if let Some(body) = tag {
            builder = builder.id3(body);
        }
        if marker {
            builder = builder.marker(spec, b"Xing");
        }
        let data = builder.frames(spec, frames).build();

        let whole = scan(SliceSource::new(&data, data.len())).expect("single chunk");
        let mut split = SplitSource::new(&data, cuts);
        let pieces = scan(&mut split).expect("split chunks");

        prop_assert_eq!(&whole, &pieces);
        prop_assert_eq!(whole.frame_count, frames as u64);
        prop_assert_eq!(split.cancelled, 1);
    }

    #[test]
    fn prop_id3_prefix_does_not_change_count(
        spec in frame_params(),
        frames in 1usize..40,
        body in 0usize..5000,
        chunk in 1usize..2000,
    ) {
        let plain = StreamBuilder::new().frames(spec, frames).build();
        let tagged = StreamBuilder::new().id3(body).frames(spec, frames).build();

        let plain_count = count_frames(SliceSource::new(&plain, chunk)).expect("plain");
        let tagged_count = count_frames(SliceSource::new(&tagged, chunk)).expect("tagged");
        prop_assert_eq!(plain_count, tagged_count);
    }

    #[test]
    fn prop_cbr_count_is_length_over_frame_size(
        spec in frame_params(),
        frames in 1usize..200,
        chunk in 1usize..4096,
    ) {
        let data = StreamBuilder::new().frames(spec, frames).build();
        let counted = count_frames(SliceSource::new(&data, chunk)).expect("valid stream");
        prop_assert_eq!(counted, (data.len() / spec.length()) as u64);
    }
}
