// Output formatting — terminal display of pipeline results.

pub mod terminal;
