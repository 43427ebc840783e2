// The ordered history of committed strokes; also the unit of undo.

use crate::stroke::Stroke;

#[derive(Debug, Default)]
pub struct StrokeLog {
    strokes: Vec<Stroke>,
    // Sequence number of each stroke, parallel to `strokes` and strictly increasing.
    seqs: Vec<u64>,
    next_seq: u64,
}

impl StrokeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
        self.seqs.push(self.next_seq);
        self.next_seq += 1;
    }

    /// Remove the most recent stroke. Empty log: nothing happens.
    pub fn undo_last(&mut self) -> Option<Stroke> {
        self.seqs.pop();
        self.strokes.pop()
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.seqs.clear();
    }

    /// A point in history: every stroke present now is "before" it,
    /// every stroke appended later is not.
    pub fn mark(&self) -> u64 {
        self.next_seq
    }

    /// Drop the strokes appended before `mark` that are still here.
    /// Later strokes stay, in order.
    pub fn remove_before(&mut self, mark: u64) {
        let n = self.seqs.partition_point(|&seq| seq < mark);
        self.strokes.drain(..n);
        self.seqs.drain(..n);
    }

    /// Committed strokes, oldest first.
    pub fn snapshot(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}
