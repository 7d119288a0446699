#[cfg(test)]
pub(crate) mod test {
    use crate::serde::{ByteReader, DataType, FieldReader, FieldWriter, ByteWriter};
    use crate::values::*;
    use crate::ValueError;
    use anyhow::{anyhow, Result};
    use rand::seq::SliceRandom;

    /// Representative values of every variant: identities, extremes, and ordinary data.
    pub(crate) fn samples() -> Result<Vec<Value>> {
        let mut sfv = ScaleFuncValue::new();
        sfv.add_term(Term::new(2.5, 1, 2, 1), true)?;
        sfv.add_term(Term::new(-0.75, 2, 1, 0), true)?;
        sfv.add_measurement(Measurement {
            num_processes: 64,
            mean: 1.25,
            width: 0.5,
        })?;

        let mut ndoubles = NDoublesValue::new(4);
        for (i, v) in [1.5, -2., 0., f64::MAX].into_iter().enumerate() {
            ndoubles.set_value(i, v)?;
        }

        Ok(vec![
            Value::from(0.),
            Value::from(-3.75),
            Value::from(f64::MAX),
            Value::from(f64::MIN_POSITIVE),
            Value::from(i8::MIN),
            Value::from(u8::MAX),
            Value::from(-12345i16),
            Value::from(u16::MAX),
            Value::from(i32::MIN),
            Value::from(u32::MAX),
            Value::from(i64::MIN),
            Value::from(u64::MAX),
            Value::from(0u64),
            MinDoubleValue::default().into(),
            MinDoubleValue(0.).into(),
            MaxDoubleValue::default().into(),
            MaxDoubleValue(17.5).into(),
            ComplexValue::new(3., -4.).into(),
            RateValue::default().into(),
            RateValue::new(7., 9.).into(),
            StatLevel1Value::new(3, [6.]).into(),
            StatLevel2Value::new(4, [10., 30.]).into(),
            StatLevel3Value::new(2, [3., 5., 9.]).into(),
            StatLevel4Value::from_sample(2.).into(),
            StatLevel4Value::default().into(),
            TauAtomicValue::new(5, 1., 9., 20., 110.).into(),
            TauAtomicValue::default().into(),
            HistogramValue::new(3).into(),
            HistogramValue::with_bins(-1., 5., vec![2., 0., 7.]).into(),
            ndoubles.into(),
            NDoublesValue::new(0).into(),
            sfv.into(),
            ScaleFuncValue::new().into(),
            StringValue::new("call_path::main").into(),
            StringValue::default().into(),
        ])
    }

    #[test]
    fn byte_buffer_round_trip() -> Result<()> {
        for sample in samples()? {
            let bytes = sample.to_bytes()?;
            assert_eq!(sample.byte_size(), bytes.len(), "\n{:?}\n{:?}\n", sample, bytes);

            let mut decoded = sample.zero_like();
            let r_len = decoded.read_bytes(&bytes)?;
            assert_eq!(bytes.len(), r_len);
            assert_eq!(sample, decoded, "\n{:?}\n{:?}\n", sample, bytes);
            assert_eq!(bytes, decoded.to_bytes()?);
        }
        Ok(())
    }

    #[test]
    fn doubles_round_trip() -> Result<()> {
        for sample in samples()? {
            let mut slots = vec![];
            if sample.data_type() == DataType::String {
                let res = sample.write_doubles(&mut slots);
                assert!(matches!(res, Err(ValueError::UnsupportedEncoding { .. })));
                continue;
            }
            sample.write_doubles(&mut slots)?;

            let mut decoded = sample.zero_like();
            let r_len = decoded.read_doubles(&slots)?;
            assert_eq!(slots.len(), r_len);
            assert_eq!(sample, decoded, "\n{:?}\n{:?}\n", sample, slots);
        }
        Ok(())
    }

    #[test]
    fn concatenated_values_decode_in_sequence() -> Result<()> {
        let mut samples = samples()?;
        samples.shuffle(&mut rand::thread_rng());

        let mut buf = vec![];
        for sample in &samples {
            sample.write_bytes(&mut buf)?;
        }

        let mut r_len = 0;
        for sample in &samples {
            let mut decoded = sample.zero_like();
            r_len += decoded.read_bytes(&buf[r_len..])?;
            assert_eq!(sample, &decoded);
        }
        assert_eq!(buf.len(), r_len);
        Ok(())
    }

    #[test]
    fn field_order_is_declaration_order() -> Result<()> {
        let rate = Value::from(RateValue::new(2., 4.));
        let expected = [2f64.to_ne_bytes(), 4f64.to_ne_bytes()].concat();
        assert_eq!(expected, rate.to_bytes()?);

        let stat = Value::from(StatLevel2Value::new(3, [1.5, 2.5]));
        let expected = [
            &3u32.to_ne_bytes()[..],
            &1.5f64.to_ne_bytes()[..],
            &2.5f64.to_ne_bytes()[..],
        ]
        .concat();
        assert_eq!(expected, stat.to_bytes()?);

        let tau = Value::from(TauAtomicValue::new(2, -1., 1., 0., 2.));
        let mut slots = vec![];
        tau.write_doubles(&mut slots)?;
        assert_eq!(vec![2., -1., 1., 0., 2.], slots);

        let histogram = Value::from(HistogramValue::with_bins(0., 4., vec![1., 3.]));
        let mut slots = vec![];
        histogram.write_doubles(&mut slots)?;
        assert_eq!(vec![0., 4., 1., 3.], slots);
        Ok(())
    }

    #[test]
    fn string_is_length_prefixed_with_terminator() -> Result<()> {
        let bytes = Value::from("abc").to_bytes()?;
        let mut expected = 4u64.to_ne_bytes().to_vec();
        expected.extend_from_slice(b"abc\0");
        assert_eq!(expected, bytes);
        Ok(())
    }

    #[test]
    fn scale_func_is_padded_to_capacity() -> Result<()> {
        for sample in samples()? {
            if sample.data_type() != DataType::ScaleFunc {
                continue;
            }
            assert_eq!(SCALE_FUNC_BYTE_SIZE, sample.to_bytes()?.len());
            let mut slots = vec![];
            sample.write_doubles(&mut slots)?;
            assert_eq!(152, slots.len());
        }
        assert_eq!(848, SCALE_FUNC_BYTE_SIZE);
        Ok(())
    }

    #[test]
    fn truncated_input_is_reported() -> Result<()> {
        for sample in samples()? {
            let bytes = sample.to_bytes()?;
            if bytes.is_empty() {
                continue;
            }
            let mut decoded = sample.zero_like();
            match decoded.read_bytes(&bytes[..bytes.len() - 1]) {
                Err(ValueError::Truncated { .. }) => {}
                other => return Err(anyhow!("{:?} decoded from short input: {:?}", sample, other)),
            }
            assert_eq!(sample.zero_like(), decoded, "\n{:?}\n", sample);
        }
        Ok(())
    }

    #[test]
    fn short_input_leaves_the_value_untouched() -> Result<()> {
        let stat = Value::from(StatLevel4Value::new(9, [1., 2., 3., 4.]));
        let tau = Value::from(TauAtomicValue::new(3, -1., 7., 12., 50.));
        let hist = Value::from(HistogramValue::with_bins(-5., 5., vec![1., 2., 3.]));
        for (sample, prior) in [
            (Value::from(StatLevel4Value::new(2, [8., 8., 8., 8.])), stat),
            (Value::from(TauAtomicValue::new(1, 0., 0., 0., 0.)), tau),
            (Value::from(HistogramValue::with_bins(0., 1., vec![4., 4., 4.])), hist),
        ] {
            let bytes = sample.to_bytes()?;
            for cut in 1..bytes.len() {
                let mut decoded = prior.clone();
                let res = decoded.read_bytes(&bytes[..cut]);
                assert!(matches!(res, Err(ValueError::Truncated { .. })), "{:?}", res);
                assert_eq!(prior, decoded, "cut at {}", cut);
            }
        }
        Ok(())
    }

    #[test]
    fn scale_func_rejects_impossible_counts() -> Result<()> {
        let mut buf = vec![];
        let mut w = ByteWriter::new(&mut buf);
        w.put(31u32)?;
        w.put(0u32)?;
        buf.resize(SCALE_FUNC_BYTE_SIZE, 0);

        let mut sfv = Value::from(ScaleFuncValue::new());
        let res = sfv.read_bytes(&buf);
        assert!(matches!(res, Err(ValueError::Malformed { .. })), "{:?}", res);
        Ok(())
    }

    #[test]
    fn scale_func_terms_are_normalized_on_decode() -> Result<()> {
        let wire_terms = [
            Term::new(1., 1, 1, 0),
            Term::new(0., 4, 1, 0),
            Term::new(2., 2, 1, 0),
            Term::new(3., 1, 1, 0),
        ];
        let mut buf = vec![];
        let mut w = ByteWriter::new(&mut buf);
        w.put(wire_terms.len() as u32)?;
        w.put(0u32)?;
        for t in &wire_terms {
            w.put(t.a)?;
            w.put(t.b)?;
            w.put(t.c)?;
            w.put(t.d)?;
        }
        buf.resize(SCALE_FUNC_BYTE_SIZE, 0);

        let mut expected = ScaleFuncValue::new();
        for t in wire_terms {
            expected.add_term(t, true)?;
        }
        assert_eq!(&[Term::new(2., 2, 1, 0), Term::new(4., 1, 1, 0)], expected.terms());

        let mut decoded = Value::from(ScaleFuncValue::new());
        assert_eq!(SCALE_FUNC_BYTE_SIZE, decoded.read_bytes(&buf)?);
        assert_eq!(Value::from(expected), decoded);
        Ok(())
    }

    #[test]
    fn endianness_transform_swaps_each_field() -> Result<()> {
        let double = Value::from(1.5);
        let mut bytes = double.to_bytes()?;
        double.transform_endianness(&mut bytes)?;
        let mut expected = 1.5f64.to_ne_bytes();
        expected.reverse();
        assert_eq!(&expected[..], &bytes[..]);

        let stat = Value::from(StatLevel1Value::new(7, [0.25]));
        let mut bytes = stat.to_bytes()?;
        stat.transform_endianness(&mut bytes)?;
        let mut r = ByteReader::with_byte_swap(&bytes, true);
        assert_eq!(7u32, r.get::<u32>()?);
        assert_eq!(0.25f64, r.get::<f64>()?);

        for sample in samples()? {
            let native = sample.to_bytes()?;
            let mut foreign = vec![];
            sample.encode(&mut ByteWriter::with_byte_swap(&mut foreign, true))?;
            assert_eq!(native.len(), foreign.len());

            let len = sample.transform_endianness(&mut foreign)?;
            assert_eq!(native.len(), len);
            assert_eq!(native, foreign, "\n{:?}\n", sample);
        }
        Ok(())
    }
}
