/// The minimal reversible change to a buffer.
///
/// Applying an operation returns the operation that reverts it; any bytes
/// the inverse needs are captured from the buffer before it is mutated.
/// Preconditions are checked before anything is touched, so a failing
/// operation leaves the buffer exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Insert {
        position: u64,
        data: Vec<u8>,
    },
    Remove {
        position: u64,
        length: u64,
    },
    Overwrite {
        position: u64,
        data: Vec<u8>,
    },
    /// Moves `source` so that it starts where `destination` pointed before
    /// the move. `destination` may not fall strictly inside `source`.
    Move {
        source: std::ops::Range<u64>,
        destination: u64,
    },
}

impl Operation {
    #[inline]
    #[must_use]
    pub fn kind(&self) -> crate::enums::OperationKind {
        match self {
            Operation::Insert { .. } => crate::enums::OperationKind::Insert,
            Operation::Remove { .. } => crate::enums::OperationKind::Remove,
            Operation::Overwrite { .. } => crate::enums::OperationKind::Overwrite,
            Operation::Move { .. } => crate::enums::OperationKind::Move,
        }
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> u64 {
        match self {
            Operation::Insert { position, .. }
            | Operation::Remove { position, .. }
            | Operation::Overwrite { position, .. } => *position,
            Operation::Move { source, .. } => source.start,
        }
    }

    /// Number of bytes the operation affects.
    #[inline]
    #[must_use]
    pub fn length(&self) -> u64 {
        match self {
            Operation::Insert { data, .. } | Operation::Overwrite { data, .. } => data.len() as u64,
            Operation::Remove { length, .. } => *length,
            Operation::Move { source, .. } => source.end.saturating_sub(source.start),
        }
    }

    /// Bytes retained by the operation itself.
    #[inline]
    #[must_use]
    pub fn footprint(&self) -> u64 {
        match self {
            Operation::Insert { data, .. } | Operation::Overwrite { data, .. } => data.len() as u64,
            Operation::Remove { .. } | Operation::Move { .. } => 0,
        }
    }

    /// Where the moved block starts once a move is applied.
    #[inline]
    fn move_target(source: &std::ops::Range<u64>, destination: u64) -> u64 {
        if destination >= source.end {
            destination - (source.end - source.start)
        } else {
            destination
        }
    }

    /// # Errors
    ///
    /// `EditError::OperationFailure` when the operation cannot apply to a
    /// buffer of `size` bytes.
    pub fn validate(&self, size: u64) -> crate::errors::EditResult<()> {
        let kind = self.kind();
        let fits = |position: u64, length: u64| {
            position
                .checked_add(length)
                .is_some_and(|end| end <= size)
        };

        match self {
            Operation::Insert { position, .. } if *position > size => Err(
                crate::errors::EditError::operation(kind, format!("position {position} is past size {size}")),
            ),
            Operation::Remove { position, length } if !fits(*position, *length) => {
                Err(crate::errors::EditError::operation(
                    kind,
                    format!("range {position}+{length} exceeds size {size}"),
                ))
            }
            Operation::Overwrite { position, data } if !fits(*position, data.len() as u64) => {
                Err(crate::errors::EditError::operation(
                    kind,
                    format!("range {position}+{} exceeds size {size}", data.len()),
                ))
            }
            Operation::Move {
                source,
                destination,
            } => {
                if source.start > source.end || source.end > size || *destination > size {
                    return Err(crate::errors::EditError::operation(
                        kind,
                        format!("move of {source:?} to {destination} exceeds size {size}"),
                    ));
                }

                if source.start < *destination && *destination < source.end {
                    return Err(crate::errors::EditError::operation(
                        kind,
                        format!("destination {destination} is inside {source:?}"),
                    ));
                }

                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Applies the operation and returns its inverse.
    ///
    /// # Errors
    ///
    /// - `EditError::OperationFailure` if a precondition does not hold.
    /// - Read errors from the original data while capturing bytes.
    pub fn apply(
        &self,
        table: &mut crate::piece_table::table::PieceTable,
    ) -> crate::errors::EditResult<Operation> {
        self.validate(table.len())?;

        match self {
            Operation::Insert { position, data } => {
                table.insert(*position, data)?;

                Ok(Operation::Remove {
                    position: *position,
                    length: data.len() as u64,
                })
            }
            Operation::Remove { position, length } => {
                let data = table.remove(*position, *length)?;

                Ok(Operation::Insert {
                    position: *position,
                    data,
                })
            }
            Operation::Overwrite { position, data } => {
                let previous = table.overwrite(*position, data)?;

                Ok(Operation::Overwrite {
                    position: *position,
                    data: previous,
                })
            }
            Operation::Move {
                source,
                destination,
            } => {
                let length = source.end - source.start;
                let target = Self::move_target(source, *destination);
                let block = table.remove(source.start, length)?;

                table.insert(target, &block)?;

                // In the moved buffer, put the block back so it starts at source.start
                let back = if target <= source.start {
                    source.start + length
                } else {
                    source.start
                };

                Ok(Operation::Move {
                    source: target..target + length,
                    destination: back,
                })
            }
        }
    }

    /// Caret position after the operation has been applied.
    #[must_use]
    pub fn caret_after(&self) -> u64 {
        match self {
            Operation::Insert { position, data } | Operation::Overwrite { position, data } => {
                position + data.len() as u64
            }
            Operation::Remove { position, .. } => *position,
            Operation::Move {
                source,
                destination,
            } => Self::move_target(source, *destination),
        }
    }
}

#[cfg(test)]
mod operation_tests {
    use proptest::prelude::*;

    fn table(bytes: &[u8]) -> crate::piece_table::table::PieceTable {
        crate::piece_table::table::PieceTable::from_bytes(bytes.to_vec())
    }

    #[test]
    fn insert_inverse_is_remove() {
        let mut pt = table(b"ABC");
        let op = super::Operation::Insert {
            position: 3,
            data: b"XYZ".to_vec(),
        };
        let inverse = op.apply(&mut pt).unwrap();

        assert_eq!(pt.to_vec().unwrap(), b"ABCXYZ");
        assert_eq!(
            inverse,
            super::Operation::Remove {
                position: 3,
                length: 3
            }
        );

        inverse.apply(&mut pt).unwrap();
        assert_eq!(pt.to_vec().unwrap(), b"ABC");
    }

    #[test]
    fn remove_captures_bytes() {
        let mut pt = table(b"ABCDEF");
        let inverse = super::Operation::Remove {
            position: 1,
            length: 3,
        }
        .apply(&mut pt)
        .unwrap();

        assert_eq!(pt.to_vec().unwrap(), b"AEF");
        assert_eq!(
            inverse,
            super::Operation::Insert {
                position: 1,
                data: b"BCD".to_vec()
            }
        );
        assert_eq!(inverse.footprint(), 3);
    }

    #[test]
    fn overwrite_captures_previous_bytes() {
        let mut pt = table(b"ABCDEF");
        let inverse = super::Operation::Overwrite {
            position: 2,
            data: b"xy".to_vec(),
        }
        .apply(&mut pt)
        .unwrap();

        assert_eq!(pt.to_vec().unwrap(), b"ABxyEF");

        inverse.apply(&mut pt).unwrap();
        assert_eq!(pt.to_vec().unwrap(), b"ABCDEF");
    }

    #[test]
    fn move_forward_and_back() {
        let mut pt = table(b"ABCDEFGH");
        let op = super::Operation::Move {
            source: 1..3,
            destination: 6,
        };

        assert_eq!(op.caret_after(), 4);

        let inverse = op.apply(&mut pt).unwrap();

        assert_eq!(pt.to_vec().unwrap(), b"ADEFBCGH");

        inverse.apply(&mut pt).unwrap();
        assert_eq!(pt.to_vec().unwrap(), b"ABCDEFGH");
    }

    #[test]
    fn move_backward_and_back() {
        let mut pt = table(b"ABCDEFGH");
        let inverse = super::Operation::Move {
            source: 5..7,
            destination: 1,
        }
        .apply(&mut pt)
        .unwrap();

        assert_eq!(pt.to_vec().unwrap(), b"AFGBCDEH");

        inverse.apply(&mut pt).unwrap();
        assert_eq!(pt.to_vec().unwrap(), b"ABCDEFGH");
    }

    #[test]
    fn move_into_itself_fails() {
        let mut pt = table(b"ABCDEFGH");
        let result = super::Operation::Move {
            source: 2..6,
            destination: 4,
        }
        .apply(&mut pt);

        assert!(matches!(
            result,
            Err(crate::errors::EditError::OperationFailure {
                kind: crate::enums::OperationKind::Move,
                ..
            })
        ));
        assert_eq!(pt.to_vec().unwrap(), b"ABCDEFGH");
    }

    #[test]
    fn preconditions_fail_loudly_without_mutation() {
        let mut pt = table(b"ABC");
        let failing = [
            super::Operation::Insert {
                position: 4,
                data: b"x".to_vec(),
            },
            super::Operation::Remove {
                position: 2,
                length: 2,
            },
            super::Operation::Overwrite {
                position: 2,
                data: b"xy".to_vec(),
            },
            super::Operation::Move {
                source: 0..4,
                destination: 0,
            },
        ];

        for op in failing {
            assert!(
                matches!(
                    op.apply(&mut pt),
                    Err(crate::errors::EditError::OperationFailure { .. })
                ),
                "{op:?} must fail"
            );
            assert_eq!(pt.to_vec().unwrap(), b"ABC");
        }
    }

    #[test]
    fn zero_length_operations_are_no_ops() {
        let mut pt = table(b"ABC");
        let ops = [
            super::Operation::Insert {
                position: 3,
                data: Vec::new(),
            },
            super::Operation::Remove {
                position: 0,
                length: 0,
            },
            super::Operation::Overwrite {
                position: 3,
                data: Vec::new(),
            },
            super::Operation::Move {
                source: 1..1,
                destination: 3,
            },
        ];

        for op in ops {
            let inverse = op.apply(&mut pt).unwrap();

            assert_eq!(pt.to_vec().unwrap(), b"ABC");
            inverse.apply(&mut pt).unwrap();
            assert_eq!(pt.to_vec().unwrap(), b"ABC");
        }
    }

    proptest! {
        #[test]
        fn insert_then_inverse_restores_content(
            original in proptest::collection::vec(any::<u8>(), 0..64),
            data in proptest::collection::vec(any::<u8>(), 0..16),
            position_seed in any::<u64>(),
        ) {
            let mut pt = table(&original);
            let position = position_seed % (original.len() as u64 + 1);
            let inverse = super::Operation::Insert { position, data: data.clone() }
                .apply(&mut pt)
                .unwrap();

            prop_assert_eq!(pt.len(), (original.len() + data.len()) as u64);

            inverse.apply(&mut pt).unwrap();

            prop_assert_eq!(pt.to_vec().unwrap(), original);
        }

        #[test]
        fn move_then_inverse_restores_content(
            original in proptest::collection::vec(any::<u8>(), 1..48),
            a in any::<u64>(),
            b in any::<u64>(),
            d in any::<u64>(),
        ) {
            let size = original.len() as u64;
            let (start, end) = {
                let x = a % (size + 1);
                let y = b % (size + 1);

                (x.min(y), x.max(y))
            };
            let destination = d % (size + 1);

            prop_assume!(!(start < destination && destination < end));

            let mut pt = table(&original);
            let op = super::Operation::Move { source: start..end, destination };
            let inverse = op.apply(&mut pt).unwrap();

            prop_assert_eq!(pt.len(), size);

            let moved_start = op.caret_after() as usize;
            let moved = pt.to_vec().unwrap();

            prop_assert_eq!(
                &moved[moved_start..moved_start + (end - start) as usize],
                &original[start as usize..end as usize]
            );

            inverse.apply(&mut pt).unwrap();

            prop_assert_eq!(pt.to_vec().unwrap(), original);
        }
    }
}
