use std::ops::{AddAssign, SubAssign};

/// The mutable edit buffer of one document.
///
/// Never writes to the original data: removals and overwrites only reshape
/// the piece list, and inserted bytes go to the append buffer.
#[derive(Debug)]
pub struct PieceTable {
    /// Original unchanged data, read page by page.
    pub original: paged_data::PagedBinaryData,
    /// Append-only buffer storing inserted bytes.
    pub buf: Vec<u8>,
    /// Ordered list of pieces describing the visible document.
    pub pieces: Vec<crate::piece_table::piece::Piece>,
}

pub trait SliceOf {
    fn slice_of(
        &self,
        piece: &crate::piece_table::piece::Piece,
        start: u64,
        end: u64,
    ) -> crate::errors::EditResult<std::borrow::Cow<'_, [u8]>>;
}

/*

====================================
========= CREATION METHOD ==========
====================================

*/

impl PieceTable {
    #[must_use]
    pub fn new(original: paged_data::PagedBinaryData) -> Self {
        let mut pieces = Vec::new();
        let size = original.size();

        if size > 0 {
            pieces.push(crate::piece_table::piece::Piece {
                buf_kind: crate::enums::BufferKind::Original,
                range: 0..size,
            });
        }

        Self {
            original,
            buf: Vec::with_capacity(crate::piece_table::BASELINE_CAPACITY),
            pieces,
        }
    }

    #[must_use]
    pub fn from_bytes(bytes: impl Into<std::rc::Rc<[u8]>>) -> Self {
        Self::new(paged_data::PagedBinaryData::from_bytes(bytes))
    }
}

/*

====================================
========= INLINE METHODS  ==========
====================================

*/

impl PieceTable {
    /// Total document length in bytes
    #[inline]
    pub fn len(&self) -> u64 {
        self.pieces.iter().map(super::piece::Piece::len).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty() || self.len() == 0
    }

    /// Piece index and offset inside it for document position `pos`.
    /// On a piece boundary this is the end of the earlier piece.
    #[inline]
    pub fn locate(&self, mut pos: u64) -> (usize, u64) {
        for (idx, piece) in self.pieces.iter().enumerate() {
            let piece_len = piece.len();

            if pos <= piece_len {
                return (idx, pos);
            }

            pos.sub_assign(piece_len);
        }

        (self.pieces.len(), 0)
    }

    /// # Errors
    ///
    /// `EditError::OutOfBounds` unless `pos + len <= self.len()`.
    #[inline]
    pub fn check_range(&self, pos: u64, len: u64) -> crate::errors::EditResult<()> {
        let size = self.len();

        match pos.checked_add(len) {
            Some(end) if end <= size => Ok(()),
            _ => Err(crate::errors::EditError::OutOfBounds {
                position: pos,
                length: len,
                size,
            }),
        }
    }
}

impl SliceOf for PieceTable {
    #[inline]
    fn slice_of(
        &self,
        piece: &crate::piece_table::piece::Piece,
        start: u64,
        end: u64,
    ) -> crate::errors::EditResult<std::borrow::Cow<'_, [u8]>> {
        match piece.buf_kind {
            crate::enums::BufferKind::Original => Ok(std::borrow::Cow::Owned(
                self.original.read(start, end - start)?,
            )),
            crate::enums::BufferKind::Add => {
                let s = <u64 as TryInto<usize>>::try_into(start)?;
                let e = <u64 as TryInto<usize>>::try_into(end)?;

                Ok(std::borrow::Cow::Borrowed(&self.buf[s..e]))
            }
        }
    }
}

/*

=====================================
========= INSERT / REMOVE  ==========
=====================================

*/

impl PieceTable {
    fn merge_or_continue(
        &mut self,
        idx: usize,
        offset: u64,
        buf_kind: crate::enums::BufferKind,
        range: std::ops::Range<u64>,
    ) -> bool {
        let pieces_len = self.pieces.len();
        let prev_idx = if idx == pieces_len || offset == 0 {
            idx.checked_sub(1)
        } else if offset == self.pieces[idx].len() {
            Some(idx)
        } else {
            None
        };

        if let Some(prev) = prev_idx.and_then(|i| self.pieces.get_mut(i))
            && prev.buf_kind == buf_kind
            && prev.range.end == range.start
        {
            prev.range.end = range.end;

            return false;
        }

        true
    }

    fn insert_no_history(
        &mut self,
        pos: u64,
        range: std::ops::Range<u64>,
        buf_kind: crate::enums::BufferKind,
    ) -> crate::errors::EditResult<()> {
        let (idx, offset) = self.locate(pos);

        if !self.merge_or_continue(idx, offset, buf_kind, range.clone()) {
            return Ok(());
        }

        let new_piece = crate::piece_table::piece::Piece {
            buf_kind,
            range: range.clone(),
        };

        if idx == self.pieces.len() {
            self.pieces.push(new_piece);

            return Ok(());
        }

        if offset == 0 {
            self.pieces.insert(idx, new_piece);

            return Ok(());
        }

        let piece = self.pieces[idx].clone();

        if offset == piece.len() {
            self.pieces.insert(idx + 1, new_piece);

            return Ok(());
        }

        let start_plus_offset = piece
            .range
            .start
            .checked_add(offset)
            .ok_or(crate::enums::MathError::Overflow)?;

        self.pieces.splice(
            idx..=idx,
            [
                crate::piece_table::piece::Piece {
                    buf_kind: piece.buf_kind,
                    range: piece.range.start..start_plus_offset,
                },
                new_piece,
                crate::piece_table::piece::Piece {
                    buf_kind: piece.buf_kind,
                    range: start_plus_offset..piece.range.end,
                },
            ],
        );

        Ok(())
    }

    /// # Errors
    ///
    /// `EditError::OutOfBounds` if `pos` is past the end.
    pub fn insert(&mut self, pos: u64, bytes: &[u8]) -> crate::errors::EditResult<()> {
        self.check_range(pos, 0)?;

        if bytes.is_empty() {
            return Ok(());
        }

        let start = <usize as TryInto<u64>>::try_into(self.buf.len())?;
        let end = start
            .checked_add(<usize as TryInto<u64>>::try_into(bytes.len())?)
            .ok_or(crate::enums::MathError::Overflow)?;

        self.buf.extend_from_slice(bytes);
        self.insert_no_history(pos, start..end, crate::enums::BufferKind::Add)
    }

    fn delete_no_history(&mut self, pos: u64, mut len: u64) -> crate::errors::EditResult<()> {
        let (mut idx, mut offset) = self.locate(pos);

        while len > 0 && idx < self.pieces.len() {
            let piece = self.pieces[idx].clone();
            let piece_len = piece.len();

            if offset >= piece_len {
                // Boundary: the bytes start in the next piece
                idx.add_assign(1);
                offset = 0;

                continue;
            }

            let delete_end = offset.saturating_add(len).min(piece_len);
            let remove_len = delete_end - offset;

            if offset == 0 && delete_end == piece_len {
                // Full delete: just drop the piece
                self.pieces.remove(idx);
            } else if offset == 0 {
                // Delete start: shrink the piece from the left
                self.pieces[idx].range.start.add_assign(remove_len);
            } else if delete_end == piece_len {
                // Delete end: shrink the piece from the right
                self.pieces[idx].range.end.sub_assign(remove_len);
                idx.add_assign(1);
            } else {
                // Delete middle: keep both sides of the hole
                self.pieces.splice(
                    idx..=idx,
                    [
                        crate::piece_table::piece::Piece {
                            buf_kind: piece.buf_kind,
                            range: piece.range.start..piece.range.start + offset,
                        },
                        crate::piece_table::piece::Piece {
                            buf_kind: piece.buf_kind,
                            range: piece.range.start + delete_end..piece.range.end,
                        },
                    ],
                );
                idx.add_assign(2);
            }

            len.sub_assign(remove_len);
            offset = 0;
        }

        if len > 0 {
            return Err(crate::enums::MathError::OutOfBounds(len).into());
        }

        Ok(())
    }

    /// Removes `len` bytes at `pos` and returns them.
    ///
    /// # Errors
    ///
    /// `EditError::OutOfBounds` unless `pos + len <= self.len()`.
    pub fn remove(&mut self, pos: u64, len: u64) -> crate::errors::EditResult<Vec<u8>> {
        let removed = self.read(pos, len)?;

        self.delete_no_history(pos, len)?;

        Ok(removed)
    }

    /// Replaces `bytes.len()` bytes at `pos` and returns the previous ones.
    ///
    /// # Errors
    ///
    /// `EditError::OutOfBounds` unless the whole range is inside the document.
    pub fn overwrite(&mut self, pos: u64, bytes: &[u8]) -> crate::errors::EditResult<Vec<u8>> {
        let len = <usize as TryInto<u64>>::try_into(bytes.len())?;
        let previous = self.read(pos, len)?;

        self.delete_no_history(pos, len)?;
        self.insert(pos, bytes)?;

        Ok(previous)
    }
}

/*

====================================
============== READS ===============
====================================

*/

impl PieceTable {
    /// # Errors
    ///
    /// `EditError::OutOfBounds` unless `pos + len <= self.len()`.
    pub fn read(&self, mut pos: u64, mut len: u64) -> crate::errors::EditResult<Vec<u8>> {
        self.check_range(pos, len)?;

        let mut res = Vec::with_capacity(<u64 as TryInto<usize>>::try_into(len)?);

        for piece in &self.pieces {
            if len == 0 {
                break;
            }

            let piece_len = piece.len();

            if pos >= piece_len {
                pos.sub_assign(piece_len);

                continue;
            }

            let start = piece.range.start + pos;
            let take = (piece_len - pos).min(len);

            res.extend_from_slice(&SliceOf::slice_of(self, piece, start, start + take)?);

            len.sub_assign(take);
            pos = 0;
        }

        Ok(res)
    }

    /// # Errors
    ///
    /// `EditError::OutOfBounds` at or past the end.
    pub fn byte_at(&self, pos: u64) -> crate::errors::EditResult<u8> {
        Ok(self.read(pos, 1)?[0])
    }

    /// The whole document. Materializes every page; meant for small data.
    ///
    /// # Errors
    ///
    /// Whatever the original source reports.
    pub fn to_vec(&self) -> crate::errors::EditResult<Vec<u8>> {
        self.read(0, self.len())
    }
}

/*

=================
===== RESET =====
=================

*/

impl PieceTable {
    /// Rebinds the table to new original data and forgets every edit.
    ///
    /// Any history recorded against the old content points at offsets that
    /// no longer mean anything, so callers must clear it too.
    pub fn reset_to(&mut self, original: paged_data::PagedBinaryData) {
        let size = original.size();

        self.original = original;
        self.buf.clear();

        if self.buf.capacity() > crate::piece_table::BASELINE_CAPACITY {
            self.buf.shrink_to(crate::piece_table::BASELINE_CAPACITY);
        }

        self.pieces.clear();

        if size > 0 {
            self.pieces.push(crate::piece_table::piece::Piece {
                buf_kind: crate::enums::BufferKind::Original,
                range: 0..size,
            });
        }
    }
}
