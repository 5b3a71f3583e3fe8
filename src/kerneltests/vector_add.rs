use crate::diagnostic::Diagnostic;
use crate::gpu::{groups_1d, launch, BufferSpec, GpuContext, KernelProgram};
use crate::harness::compare::check_close;
use crate::harness::data;
use crate::harness::registry::{TestCase, TestSuite};

pub const SUITE: TestSuite = TestSuite {
    name: "vector_add",
    tests: &[
        TestCase {
            name: "matches_host_reference",
            run: matches_host_reference,
        },
        TestCase {
            name: "single_element",
            run: single_element,
        },
    ],
};

fn matches_host_reference(ctx: &GpuContext, program: &KernelProgram) -> Result<(), Diagnostic> {
    const N: usize = 100;
    let a = data::uniform(N, 0.0, 1.0, 0x0add_0001);
    let b = data::uniform(N, 0.0, 1.0, 0x0add_0002);
    let expected: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x + y).collect();

    let outputs = launch(
        ctx,
        program,
        "vector_add",
        &[
            BufferSpec::Input(&a),
            BufferSpec::Input(&b),
            BufferSpec::Output(N),
        ],
        &[N as u32],
        groups_1d(N),
    )?;
    check_close("vector_add", &expected, &outputs[0])
}

fn single_element(ctx: &GpuContext, program: &KernelProgram) -> Result<(), Diagnostic> {
    let outputs = launch(
        ctx,
        program,
        "vector_add",
        &[
            BufferSpec::Input(&[1.5]),
            BufferSpec::Input(&[-0.25]),
            BufferSpec::Output(1),
        ],
        &[1],
        groups_1d(1),
    )?;
    check_close("vector_add", &[1.25], &outputs[0])
}
