use super::*;

/// Yields its bytes in small chunks to exercise the refill loop.
struct Trickle<'a> {
    data: &'a [u8],
    chunk: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn read_full_collects_across_short_reads() {
    let data: Vec<u8> = (0..10).collect();
    let mut r = Trickle {
        data: &data,
        chunk: 3,
    };
    let mut buf = [0u8; 6];
    assert_eq!(read_full(&mut r, &mut buf).unwrap(), 6);
    assert_eq!(buf, [0, 1, 2, 3, 4, 5]);

    let mut rest = [0u8; 6];
    assert_eq!(read_full(&mut r, &mut rest).unwrap(), 4);
    assert_eq!(read_full(&mut r, &mut rest).unwrap(), 0);
}

#[test]
fn open_missing_file_is_container_error() {
    let err = VideoFileSource::open("no/such/segment.mp4")
        .err()
        .expect("open must fail");
    assert!(matches!(err, ExplainerError::Container { .. }));
}
