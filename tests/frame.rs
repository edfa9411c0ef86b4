use geckoasm::{construct, construct_code, deconstruct, Bapo, CodeType, CodePacket, CodecError};
use pretty_assertions::assert_eq;

fn packet(payload: &str, codetype: CodeType, bapo: Option<&str>) -> CodePacket {
    let mut p = CodePacket::new(payload, codetype);
    p.bapo = bapo.map(|b| b.parse::<Bapo>().unwrap());
    p
}

fn words(n: usize) -> String {
    let w: Vec<String> = (0..n).map(|i| format!("{:08X}", 0x3860_0000 + i as u32)).collect();
    w.chunks(2).map(|c| c.join(" ")).collect::<Vec<_>>().join("\n")
}

#[test]
fn round_trip_every_codetype() {
    let cases = vec![
        packet("38600001 4E800020\n60000000", CodeType::Write32, Some("80001234")),
        packet("38600001 4E800020", CodeType::Write32, Some("01000100")),
        packet("48656C6C 6F00", CodeType::WriteString, Some("81000040")),
        packet("48656C6C 6F20776F\n726C6421", CodeType::WriteString, Some("00000010")),
        packet("38600001 4E800020", CodeType::Execute, None),
        packet("38600001 7C0802A6\n4E800020", CodeType::Execute, None),
        packet("38600001 7C0802A6\n90010004", CodeType::Insert, Some("80001234")),
        packet("38600001 7C0802A6", CodeType::Insert, Some("01003000")),
        packet("38600001", CodeType::InsertLink, Some("81123456")),
        packet("38600001 7C0802A6\n90010004", CodeType::InsertXor, Some("80001234")).with_guard(0xAB, 0x1F2E),
        packet("38600001 7C0802A6", CodeType::InsertXor, Some("00000040")).with_guard(0x01, 0x0000),
    ];
    for p in cases {
        let framed = construct(&p).unwrap();
        assert_eq!(deconstruct(&framed, true), p, "frame:\n{framed}");
    }
}

#[test]
fn write32_frame_shape() {
    let framed = construct(&packet("38600001 4E800020\n60000000", CodeType::Write32, Some("80001234"))).unwrap();
    assert_eq!(framed, "04001234 38600001\n04001238 4E800020\n0400123C 60000000");
    let po = construct(&packet("60000000", CodeType::Write32, Some("01000100"))).unwrap();
    assert_eq!(po, "15000100 60000000");
}

#[test]
fn write_string_frame_shape() {
    let framed = construct(&packet("48656C6C 6F00", CodeType::WriteString, Some("80000040"))).unwrap();
    assert_eq!(framed, "06000040 00000006\n48656C6C 6F000000");
    let aligned = construct(&packet("48656C6C 6F20776F", CodeType::WriteString, Some("80000040"))).unwrap();
    assert_eq!(aligned, "06000040 00000008\n48656C6C 6F20776F");
}

#[test]
fn insert_frame_shapes() {
    let odd = construct(&packet("38600001", CodeType::Insert, Some("80001234"))).unwrap();
    assert_eq!(odd, "C2001234 00000001\n38600001 00000000");
    let even = construct(&packet("38600001 38800002", CodeType::InsertLink, Some("80001234"))).unwrap();
    assert_eq!(even, "C4001234 00000002\n38600001 38800002\n60000000 00000000");
    let guarded = construct_code("38600001", Some("80001234"), Some("1F2E"), Some("AB"), CodeType::InsertXor).unwrap();
    assert_eq!(guarded, "F2001234 AB1F2E01\n38600001 00000000");
}

#[test]
fn exec_block_end_to_end() {
    let framed = construct(&CodePacket::new("4E800020", CodeType::Execute)).unwrap();
    assert_eq!(framed, "C0000000 00000001\n4E800020 4E800020");
    assert_eq!(deconstruct(&framed, true).payload, "4E800020");
    assert_eq!(deconstruct(&framed, false).payload, "4E800020");
}

#[test]
fn framed_length_is_line_aligned() {
    for ct in [CodeType::Execute, CodeType::Insert, CodeType::InsertLink, CodeType::InsertXor] {
        for n in 1..8 {
            let mut p = packet(&words(n), ct, ct.needs_bapo().then_some("80001000"));
            if ct.needs_checksum() {
                p = p.with_guard(0, 0);
            }
            let framed = construct(&p).unwrap();
            let hex: String = framed.split_whitespace().collect();
            assert_eq!(hex.len() % 16, 0, "{ct} with {n} words:\n{framed}");
        }
    }
}

#[test]
fn partial_word_is_zero_padded() {
    let framed = construct(&CodePacket::new("386000", CodeType::Execute)).unwrap();
    assert_eq!(framed, "C0000000 00000001\n38600000 4E800020");
}

#[test]
fn guarded_insert_line_limit() {
    let ok = packet(&words(0x1FD), CodeType::InsertXor, Some("80001000")).with_guard(0, 0);
    let framed = construct(&ok).unwrap();
    assert!(framed.starts_with("F2001000 000000FF\n"));

    let over = packet(&words(0x1FE), CodeType::InsertXor, Some("80001000")).with_guard(0, 0);
    assert_eq!(construct(&over), Err(CodecError::LineCountOverflow { lines: 0x100 }));
}

#[test]
fn bad_address_is_rejected() {
    let err = construct_code("60000000", Some("90001234"), None, None, CodeType::Insert).unwrap_err();
    assert!(matches!(err, CodecError::InvalidAddressEncoding { .. }));
    let err = construct_code("60000000", Some("82001234"), None, None, CodeType::Write32).unwrap_err();
    assert!(matches!(err, CodecError::InvalidAddressEncoding { .. }));
    // raw frames never look at the address
    assert_eq!(construct_code("60000000", None, None, None, CodeType::Raw).unwrap(), "60000000");
}

#[test]
fn guarded_insert_needs_checksum_fields() {
    let err = construct(&packet("60000000", CodeType::InsertXor, Some("80001234"))).unwrap_err();
    assert_eq!(err, CodecError::MissingField { codetype: CodeType::InsertXor, field: "checksum" });
    let err = construct_code("60000000", Some("80001234"), Some("12345"), Some("AB"), CodeType::InsertXor).unwrap_err();
    assert!(matches!(err, CodecError::InvalidField { field: "xor", .. }));
}

#[test]
fn malformed_payload_passes_through() {
    let text = "Error: unknown opcode `lwzz'";
    let framed = construct(&packet(text, CodeType::Insert, Some("80001234"))).unwrap();
    assert_eq!(framed, text);
    let empty = construct(&CodePacket::new("", CodeType::Execute)).unwrap();
    assert_eq!(empty, "");
}

#[test]
fn deconstruct_accepts_loose_whitespace_and_case() {
    let p = deconstruct("c2001234 00000001\r\n38600001   00000000\n", true);
    assert_eq!(p.codetype, CodeType::Insert);
    assert_eq!(p.bapo.map(|b| b.to_string()).as_deref(), Some("80001234"));
    assert_eq!(p.payload, "38600001");
}

#[test]
fn deconstruct_non_hex_is_raw() {
    let p = deconstruct("C2001234 0000000Z", true);
    assert_eq!(p, CodePacket::raw("C2001234 0000000Z"));
}
