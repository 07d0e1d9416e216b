//! Call decoder implementation using alloy-dyn-abi

use alloy_dyn_abi::{DynSolType, DynSolValue};

use crate::domain::abi::{
    AbiFunction, CalldataError, DecodeOutcome, DecodedArg, DecodedCall, SharedRegistry,
};

/// Decodes raw call input against the entries of a shared registry.
///
/// The first 4 bytes select the candidate bucket; candidates are tried in
/// registration order and the first successful decode wins. When two ABIs
/// share a selector (hash collision, or the same function registered from
/// two contracts) the first-registered entry resolves the tie.
#[derive(Debug, Clone)]
pub struct CallDecoder {
    registry: SharedRegistry,
}

impl CallDecoder {
    /// Create a decoder over the given shared registry
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    /// Get the underlying registry handle
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Decode one call input given as a hex string (with or without "0x").
    ///
    /// Input that does not parse as bytes (odd length, non-hex characters)
    /// is a [`CalldataError`], distinct from a miss. Everything that parses
    /// goes through [`CallDecoder::decode`].
    pub fn decode_hex(&self, input: &str) -> Result<DecodeOutcome, CalldataError> {
        let normalized = input
            .trim()
            .strip_prefix("0x")
            .or_else(|| input.trim().strip_prefix("0X"))
            .unwrap_or(input.trim());
        let data = hex::decode(normalized)?;
        Ok(self.decode(&data))
    }

    /// Decode one call input: `selector || encoded-arguments`.
    ///
    /// Returns `NoMatch` for input shorter than 4 bytes, an unregistered
    /// selector, or argument bytes no candidate decodes. Never errors.
    pub fn decode(&self, data: &[u8]) -> DecodeOutcome {
        if data.len() < 4 {
            return DecodeOutcome::NoMatch;
        }
        let selector: [u8; 4] = match data[..4].try_into() {
            Ok(selector) => selector,
            Err(_) => return DecodeOutcome::NoMatch,
        };
        let args_data = &data[4..];

        let registry = self.registry.read();
        for candidate in registry.candidates_for(selector) {
            if let Some(call) = decode_arguments(candidate, args_data) {
                return DecodeOutcome::Decoded(call);
            }
        }
        DecodeOutcome::NoMatch
    }
}

/// Attempt to decode the argument region against one candidate's parameter
/// list. `None` means this candidate does not fit; the caller moves on to the
/// next one.
fn decode_arguments(function: &AbiFunction, args_data: &[u8]) -> Option<DecodedCall> {
    let types: Vec<DynSolType> = function
        .inputs
        .iter()
        .map(|param| param.kind.parse::<DynSolType>().ok())
        .collect::<Option<Vec<_>>>()?;

    let decoded_values = if types.is_empty() {
        // a zero-parameter function leaves no argument bytes
        if !args_data.is_empty() {
            return None;
        }
        Vec::new()
    } else {
        // Parameter decoding applies the standard head/tail layout: fixed-width
        // values inline, dynamic values through offsets into the tail. Calldata
        // arguments are encoded as a parameter sequence, not as a standalone
        // tuple value, so this must be `abi_decode_params` — plain `abi_decode`
        // would expect an outer offset word that calldata does not carry.
        // Truncated or inconsistent bytes fail here and fail the candidate.
        // Extra bytes past a complete encoding are tolerated, matching the
        // tolerance of the reference decoders this mirrors.
        let tuple_type = DynSolType::Tuple(types);
        match tuple_type.abi_decode_params(args_data).ok()? {
            DynSolValue::Tuple(values) => values,
            other => vec![other],
        }
    };

    if decoded_values.len() != function.inputs.len() {
        return None;
    }

    let arguments: Vec<DecodedArg> = function
        .inputs
        .iter()
        .zip(decoded_values.iter())
        .enumerate()
        .map(|(idx, (param, value))| {
            let name = if param.name.trim().is_empty() {
                format!("arg{}", idx)
            } else {
                param.name.clone()
            };

            DecodedArg {
                name,
                kind: param.kind.clone(),
                value: format_dyn_sol_value(value),
            }
        })
        .collect();

    Some(DecodedCall {
        function_name: function.name.clone(),
        signature: function.signature.clone(),
        arguments,
    })
}

/// Render a decoded value exactly. Integers print as full decimal (they pass
/// through 256-bit words, never floating point), byte values as 0x-hex,
/// arrays and tuples recursively.
fn format_dyn_sol_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::FixedBytes(word, size) => {
            let bytes = &word.as_slice()[..(*size).min(32)];
            format!("0x{}", hex::encode(bytes))
        }
        DynSolValue::Address(addr) => format!("{:?}", addr),
        DynSolValue::Function(func) => format!("0x{}", hex::encode(func.as_slice())),
        DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Array(arr) | DynSolValue::FixedArray(arr) => {
            let items: Vec<String> = arr.iter().map(format_dyn_sol_value).collect();
            format!("[{}]", items.join(", "))
        }
        DynSolValue::Tuple(fields) => {
            let items: Vec<String> = fields.iter().map(format_dyn_sol_value).collect();
            format!("({})", items.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::compute_selector;

    fn registry_with(doc: serde_json::Value) -> SharedRegistry {
        let registry = SharedRegistry::new();
        registry.add_abi(&doc);
        registry
    }

    fn transfer_abi(param_name: &str) -> serde_json::Value {
        serde_json::json!([{
            "type": "function",
            "name": "transfer",
            "stateMutability": "nonpayable",
            "inputs": [
                {"name": param_name, "type": "address"},
                {"name": "amount", "type": "uint256"}
            ],
            "outputs": [{"name": "", "type": "bool"}]
        }])
    }

    /// selector + 32-byte zero-padded address + 32-byte big-endian 1000
    fn transfer_calldata() -> Vec<u8> {
        hex::decode(concat!(
            "a9059cbb",
            "0000000000000000000000001234567890123456789012345678901234567890",
            "00000000000000000000000000000000000000000000000000000000000003e8",
        ))
        .unwrap()
    }

    #[test]
    fn test_decode_transfer() {
        let decoder = CallDecoder::new(registry_with(transfer_abi("to")));

        let outcome = decoder.decode(&transfer_calldata());
        let call = outcome.as_decoded().expect("should decode");

        assert_eq!(call.function_name, "transfer");
        assert_eq!(call.signature, "transfer(address,uint256)");
        assert_eq!(call.arguments.len(), 2);
        assert_eq!(call.arguments[0].name, "to");
        assert_eq!(call.arguments[0].kind, "address");
        assert_eq!(
            call.arguments[0].value.to_lowercase(),
            "0x1234567890123456789012345678901234567890"
        );
        assert_eq!(call.arguments[1].kind, "uint256");
        assert_eq!(call.arguments[1].value, "1000");
    }

    #[test]
    fn test_empty_registry_is_no_match() {
        let decoder = CallDecoder::new(SharedRegistry::new());
        assert!(decoder.decode(&transfer_calldata()).is_no_match());
        assert!(decoder
            .decode_hex("0xa9059cbb0000000000000000000000000000000000000000000000000000000000000000")
            .unwrap()
            .is_no_match());
    }

    #[test]
    fn test_short_input_is_no_match() {
        let decoder = CallDecoder::new(registry_with(transfer_abi("to")));
        assert!(decoder.decode(&[]).is_no_match());
        assert!(decoder.decode(&[0xa9, 0x05, 0x9c]).is_no_match());
        assert!(decoder.decode_hex("0x").unwrap().is_no_match());
        assert!(decoder.decode_hex("a905").unwrap().is_no_match());
    }

    #[test]
    fn test_malformed_hex_is_an_error_not_a_miss() {
        let decoder = CallDecoder::new(registry_with(transfer_abi("to")));
        assert!(decoder.decode_hex("0xzz059cbb").is_err());
        // odd length
        assert!(decoder.decode_hex("0xa9059cb").is_err());
    }

    #[test]
    fn test_truncated_arguments_are_no_match() {
        let decoder = CallDecoder::new(registry_with(transfer_abi("to")));
        let mut data = transfer_calldata();
        data.truncate(40);
        assert!(decoder.decode(&data).is_no_match());
    }

    #[test]
    fn test_collision_resolved_by_registration_order() {
        // Two contracts register the same signature; the input decodes as
        // both, so the first-registered entry must win.
        let registry = SharedRegistry::new();
        registry.add_abi(&transfer_abi("to"));
        registry.add_abi(&transfer_abi("dst"));

        let decoder = CallDecoder::new(registry);
        let call = decoder
            .decode(&transfer_calldata())
            .as_decoded()
            .cloned()
            .expect("should decode");
        assert_eq!(call.arguments[0].name, "to");
    }

    #[test]
    fn test_zero_parameter_function_requires_empty_arguments() {
        let registry = registry_with(serde_json::json!([{
            "type": "function",
            "name": "pause",
            "stateMutability": "nonpayable",
            "inputs": [],
            "outputs": []
        }]));
        let decoder = CallDecoder::new(registry);

        let selector = compute_selector("pause()");
        let call = decoder.decode(&selector);
        assert_eq!(call.as_decoded().unwrap().function_name, "pause");
        assert!(call.as_decoded().unwrap().arguments.is_empty());

        // trailing bytes do not fit a zero-parameter layout
        let mut padded = selector.to_vec();
        padded.extend_from_slice(&[0u8; 32]);
        assert!(decoder.decode(&padded).is_no_match());
    }

    #[test]
    fn test_dynamic_params_decode_without_outer_offset() {
        // Calldata arguments are a parameter sequence; a decoder that treats
        // them as a standalone tuple value would look for an outer offset
        // word and miss every dynamic-type candidate.
        let registry = registry_with(serde_json::json!([{
            "type": "function",
            "name": "submit",
            "stateMutability": "nonpayable",
            "inputs": [
                {"name": "note", "type": "string"},
                {"name": "weights", "type": "uint256[]"}
            ],
            "outputs": []
        }]));
        let decoder = CallDecoder::new(registry);

        let mut data = compute_selector("submit(string,uint256[])").to_vec();
        data.extend(
            DynSolValue::Tuple(vec![
                DynSolValue::String("hello".to_string()),
                DynSolValue::Array(vec![DynSolValue::Uint(
                    alloy_primitives::U256::from(7u64),
                    256,
                )]),
            ])
            .abi_encode_params(),
        );

        let call = decoder.decode(&data);
        let call = call.as_decoded().expect("dynamic params should decode");
        assert_eq!(call.function_name, "submit");
        assert_eq!(call.arguments[0].value, "hello");
        assert_eq!(call.arguments[1].value, "[7]");
    }

    #[test]
    fn test_trailing_bytes_after_complete_encoding_tolerated() {
        // Documented tolerance: extra bytes past a complete argument
        // encoding do not fail the candidate.
        let decoder = CallDecoder::new(registry_with(transfer_abi("to")));

        let mut data = transfer_calldata();
        data.extend_from_slice(&[0u8; 32]);

        let call = decoder.decode(&data);
        assert_eq!(call.as_decoded().unwrap().function_name, "transfer");
    }

    #[test]
    fn test_dynamic_string_head_tail_layout() {
        let registry = registry_with(serde_json::json!([{
            "type": "function",
            "name": "setName",
            "stateMutability": "nonpayable",
            "inputs": [{"name": "name", "type": "string"}],
            "outputs": []
        }]));
        let decoder = CallDecoder::new(registry);

        // head: offset 0x20 into the tail; tail: length 5 + padded "hello"
        let mut data = compute_selector("setName(string)").to_vec();
        data.extend_from_slice(&{
            let mut word = [0u8; 32];
            word[31] = 0x20;
            word
        });
        data.extend_from_slice(&{
            let mut word = [0u8; 32];
            word[31] = 5;
            word
        });
        let mut tail = [0u8; 32];
        tail[..5].copy_from_slice(b"hello");
        data.extend_from_slice(&tail);

        let call = decoder.decode(&data);
        let call = call.as_decoded().expect("should decode");
        assert_eq!(call.function_name, "setName");
        assert_eq!(call.arguments[0].value, "hello");
    }

    #[test]
    fn test_unnamed_parameters_get_positional_names() {
        let registry = registry_with(serde_json::json!([{
            "type": "function",
            "name": "transfer",
            "stateMutability": "nonpayable",
            "inputs": [
                {"name": "", "type": "address"},
                {"name": "", "type": "uint256"}
            ],
            "outputs": []
        }]));
        let decoder = CallDecoder::new(registry);

        let call = decoder
            .decode(&transfer_calldata())
            .as_decoded()
            .cloned()
            .expect("should decode");
        assert_eq!(call.arguments[0].name, "arg0");
        assert_eq!(call.arguments[1].name, "arg1");
    }
}
