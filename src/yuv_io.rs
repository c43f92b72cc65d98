use super::common::*;
use debug_print::*;
use std::fs::File;
use std::io::{self, BufRead, Read, Write};

/// Reads planar 8-bit 4:2:0 frames and keeps their luma plane.
pub struct YuvReader<'a> {
    input: Box<dyn BufRead + 'a>,
    width: usize,
    height: usize,
}

impl<'a> YuvReader<'a> {
    pub fn standard(stdin: &'a io::Stdin, width: usize, height: usize) -> YuvReader<'a> {
        YuvReader {
            input: Box::new(stdin.lock()),
            width,
            height,
        }
    }

    pub fn file(path: &str, width: usize, height: usize) -> io::Result<YuvReader<'a>> {
        File::open(path).map(|file| YuvReader {
            input: Box::new(io::BufReader::new(file)),
            width,
            height,
        })
    }

    pub fn from_slice(v: &'a [u8], width: usize, height: usize) -> YuvReader<'a> {
        YuvReader {
            input: Box::new(v),
            width,
            height,
        }
    }

    #[inline(always)]
    fn chroma_len(&self) -> usize {
        ((self.width + 1) / 2) * ((self.height + 1) / 2)
    }

    /// Luma samples of the next frame, or `None` at a clean end of input.
    pub fn read_frame(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut luma = vec![0; self.width * self.height];
        let read = self.fill(&mut luma)?;
        if read == 0 {
            return Ok(None);
        }
        if read < luma.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("truncated frame: {} of {} luma bytes", read, luma.len()),
            ));
        }
        let mut chroma = vec![0; 2 * self.chroma_len()];
        let read = self.fill(&mut chroma)?;
        if read < chroma.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("truncated frame: {} of {} chroma bytes", read, chroma.len()),
            ));
        }
        debug_eprintln!("read frame {}x{}", self.width, self.height);
        Ok(Some(luma))
    }

    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut read_bytes = 0;
        while read_bytes < buf.len() {
            match self.input.read(&mut buf[read_bytes..]) {
                Ok(0) => break,
                Ok(s) => read_bytes += s,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(read_bytes)
    }
}

/// Writes luma planes as 4:2:0 frames with neutral chroma.
pub struct YuvWriter<'a> {
    output: Box<dyn Write + 'a>,
}

impl<'a> YuvWriter<'a> {
    pub fn file(path: &str) -> io::Result<YuvWriter<'a>> {
        File::create(path).map(|file| YuvWriter {
            output: Box::new(io::BufWriter::new(file)),
        })
    }

    pub fn from_writer<W: Write + 'a>(output: W) -> YuvWriter<'a> {
        YuvWriter {
            output: Box::new(output),
        }
    }

    pub fn write_frame(&mut self, luma: &[u8], width: usize, height: usize) -> io::Result<()> {
        self.output.write_all(luma)?;
        let chroma = vec![PIXEL_MID; ((width + 1) / 2) * ((height + 1) / 2)];
        self.output.write_all(&chroma)?;
        self.output.write_all(&chroma)?;
        self.output.flush()
    }
}
