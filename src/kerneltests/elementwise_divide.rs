use crate::diagnostic::Diagnostic;
use crate::gpu::{groups_1d, launch, BufferSpec, GpuContext, KernelProgram};
use crate::harness::compare::check_close;
use crate::harness::data;
use crate::harness::registry::{TestCase, TestSuite};

pub const SUITE: TestSuite = TestSuite {
    name: "elementwise_divide",
    tests: &[TestCase {
        name: "broadcast_rows_match_host_reference",
        run: broadcast_rows_match_host_reference,
    }],
};

/// Divides each row of a flattened matrix by its per-row scalar, the way a
/// softmax denominator is applied.
fn broadcast_rows_match_host_reference(
    ctx: &GpuContext,
    program: &KernelProgram,
) -> Result<(), Diagnostic> {
    const ROWS: usize = 8;
    const COLS: usize = 10;
    const N: usize = ROWS * COLS;

    // Offsets keep both the data and the divisors away from zero.
    let matrix = data::uniform(N, 1.0, 11.0, 0x01d1_0001);
    let row_sums = data::uniform(ROWS, 0.1, 5.1, 0x01d1_0002);
    let expected: Vec<f32> = matrix
        .iter()
        .enumerate()
        .map(|(i, &v)| v / row_sums[i / COLS])
        .collect();

    let outputs = launch(
        ctx,
        program,
        "elementwise_divide",
        &[BufferSpec::InOut(&matrix), BufferSpec::Input(&row_sums)],
        &[N as u32, COLS as u32],
        groups_1d(N),
    )?;
    check_close("elementwise_divide", &expected, &outputs[0])
}
