use crate::diagnostic::Diagnostic;
use crate::gpu::{groups_1d, launch, BufferSpec, GpuContext, KernelProgram};
use crate::harness::compare::check_close;
use crate::harness::data;
use crate::harness::registry::{TestCase, TestSuite};

pub const SUITE: TestSuite = TestSuite {
    name: "elementwise_multiply",
    tests: &[TestCase {
        name: "matches_host_reference",
        run: matches_host_reference,
    }],
};

fn matches_host_reference(ctx: &GpuContext, program: &KernelProgram) -> Result<(), Diagnostic> {
    const N: usize = 100;
    let a = data::uniform(N, 0.0, 10.0, 0x0131_0001);
    let b = data::uniform(N, 0.0, 5.0, 0x0131_0002);
    let expected: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x * y).collect();

    let outputs = launch(
        ctx,
        program,
        "elementwise_multiply",
        &[
            BufferSpec::Input(&a),
            BufferSpec::Input(&b),
            BufferSpec::Output(N),
        ],
        &[N as u32],
        groups_1d(N),
    )?;
    check_close("elementwise_multiply", &expected, &outputs[0])
}
